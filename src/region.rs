//! Backing memory for a table.
//!
//! Allocating or attaching the region (shared memory, mmap, or a plain
//! buffer) is explicitly out of scope for the core (spec §1) — the core
//! only ever requires a pointer and a byte count. `Region` is the thin
//! external collaborator that owns that memory, the same role the
//! teacher's `ShmRegion` plays for its mmap: it does not know about
//! slots, chains, or hashing, it only hands out a base pointer and a
//! length.
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A contiguous byte range a table can be opened or attached over.
///
/// `Region` may own its memory (a heap buffer, the common case for a
/// single-process cache) or simply borrow a pointer supplied by the
/// caller (a shared-memory segment or a memory-mapped file managed
/// outside this crate). Either way the table never outlives the bytes:
/// dropping the handle returned by the table does not touch the region,
/// per spec §3 "Ownership & lifecycle".
pub struct Region {
    ptr: NonNull<u8>,
    len: usize,
    owned: bool,
}

// SAFETY: Region is a dumb pointer+length pair; all synchronization is
// the caller's responsibility per spec §5.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Allocate and own a zeroed buffer of `bytes` length.
    pub fn allocate(bytes: usize) -> Self {
        assert!(bytes > 0, "region must have a positive byte length");
        let layout = Layout::array::<u8>(bytes).expect("region size overflow");
        // SAFETY: layout has non-zero size, checked above.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).expect("allocation failure");
        Region {
            ptr,
            len: bytes,
            owned: true,
        }
    }

    /// Wrap externally-owned memory (shared memory, mmap, ...).
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes for `len` bytes for the
    /// entire lifetime of this `Region`, and must not be accessed by
    /// another writer without external synchronization (spec §5).
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Self {
        Region {
            ptr: NonNull::new(ptr).expect("region pointer must not be null"),
            len,
            owned: false,
        }
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.owned {
            let layout = Layout::array::<u8>(self.len).expect("region size overflow");
            // SAFETY: this buffer was allocated by `Region::allocate` with
            // the same layout, and is only ever freed once.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}
