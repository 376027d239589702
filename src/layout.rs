//! Region layout (spec §3, §6): `#[repr(C)]` structures that live inside
//! the caller-supplied byte range. Field order groups wider fields first
//! so `#[repr(C)]` introduces no implicit padding, the same convention
//! the teacher's shared-memory layout follows.

use std::mem::size_of;

/// Size of the fixed header at the start of the region.
pub const HEADER_SIZE: usize = 64;

/// `count` tag meaning an empty slot.
pub const EMPTY: i32 = 0;

/// `count` tag meaning a collision member (home index lives in `hash`).
pub const COLLISION_MEMBER: i32 = -1;

/// `count` tag meaning a spill fragment (prev-link lives in `hash`).
pub const SPILL_FRAGMENT: i32 = -2;

/// Sentinel for "no link" in `link`/`hash` chain fields.
pub const LINK_NONE: i32 = -1;

/// Header lives at offset 0 of the region (spec §3 "Region").
///
/// There is deliberately no magic/version field (spec §6): compatibility
/// between writer and reader is by build identity, not by a stamped tag.
#[repr(C)]
#[derive(Debug)]
pub struct Header {
    pub maxslots: i32,
    pub usedslots: i32,
    pub num: i32,
    pub _pad: [u8; HEADER_SIZE - 3 * size_of::<i32>()],
}

const _: () = assert!(size_of::<Header>() == HEADER_SIZE);

/// One fixed-size slot record (spec §3 "Slot record").
///
/// `body` overlays a head/collision-member payload and a spill payload in
/// the same byte footprint, exactly as spec §3 describes: which
/// interpretation applies is determined entirely by `count`, never stored
/// redundantly.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SlotRecord<const K: usize, const V: usize, const VS: usize> {
    pub count: i32,
    pub hash: i32,
    pub link: i32,
    pub size: i32,
    pub body: SlotBody<K, V, VS>,
}

impl<const K: usize, const V: usize, const VS: usize> SlotRecord<K, V, VS> {
    pub const SIZE: usize = size_of::<Self>();

    /// Forces `V`/`VS` to be checked at monomorphization time; referenced
    /// once from every table constructor.
    pub const NONZERO_WIDTHS: () = assert!(V > 0 && VS > 0, "V and VS must both be positive");
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union SlotBody<const K: usize, const V: usize, const VS: usize> {
    pub head: HeadBody<K, V>,
    pub spill: SpillBody<VS>,
}

/// Key/value payload of a head or collision-member slot.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HeadBody<const K: usize, const V: usize> {
    pub key: [u8; K],
    pub keymd5: [u8; 16],
    pub keylen: u32,
    pub value: [u8; V],
}

/// Value-continuation payload of a spill fragment.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SpillBody<const VS: usize> {
    pub value: [u8; VS],
}

/// Total region size in bytes for a table of `maxslots` slots (spec §4.1).
pub fn region_bytes<const K: usize, const V: usize, const VS: usize>(maxslots: u32) -> usize {
    HEADER_SIZE + maxslots as usize * SlotRecord::<K, V, VS>::SIZE
}

/// Largest `maxslots` that fits in `bytes` given the slot geometry.
pub fn maxslots_for_bytes<const K: usize, const V: usize, const VS: usize>(bytes: usize) -> u32 {
    if bytes <= HEADER_SIZE {
        return 0;
    }
    ((bytes - HEADER_SIZE) / SlotRecord::<K, V, VS>::SIZE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_bytes_is_monotone_in_maxslots() {
        let a = region_bytes::<16, 32, 32>(10);
        let b = region_bytes::<16, 32, 32>(20);
        assert!(b > a);
    }

    #[test]
    fn region_of_exact_size_round_trips_maxslots() {
        let n = 37u32;
        let bytes = region_bytes::<16, 32, 32>(n);
        assert_eq!(maxslots_for_bytes::<16, 32, 32>(bytes), n);
    }
}
