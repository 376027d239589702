//! Hash primitives (spec §2.1, §4.2).
//!
//! Both are pure functions over a byte slice. The home-index hash
//! (MurmurHash3-32) is part of the region's ABI: every process attaching
//! the same region must compute the same home index for the same key, so
//! the seed is fixed at zero and never randomized (spec Non-goals).

use md5::{Digest, Md5};

/// `murmur3_32(key) mod maxslots` is the home index of `key` (spec §4.2).
///
/// Seeded with zero so the result is reproducible across processes and
/// across runs — hash randomization is explicitly out of scope.
pub fn murmur3_32(bytes: &[u8]) -> u32 {
    murmur3::murmur3_32(&mut std::io::Cursor::new(bytes), 0)
        .expect("murmur3_32 over an in-memory Cursor never fails")
}

/// Full 128-bit MD5 digest of a key, used to disambiguate truncated keys
/// longer than the inline key width `K` (spec §3 "Keys").
pub fn md5_digest(bytes: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
