//! Error kinds surfaced by the table (spec §7).

use thiserror::Error;

/// Failure modes of the public operations.
///
/// `Corrupt` is non-recoverable: it means an invariant checked during
/// removal (§4.8) did not hold, most likely because a racing writer
/// mutated the region without holding the caller's external lock.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArg,

    #[error("region too small to host one slot")]
    InvalidRegion,

    #[error("no space left (ring full or spill exhausted)")]
    NoSpace,

    #[error("key not found")]
    NotFound,

    #[error("allocation of result buffer failed")]
    OutOfMemory,

    #[error("region invariant violated")]
    Corrupt,
}

pub type Result<T> = std::result::Result<T, Error>;
