//! Probe engine (spec §4.3): linear scan with wrap-around over the slot
//! ring. Factored out as a free function over a raw slot-array pointer,
//! the same shape as the teacher's `shm/hashtable.rs` functions.
use crate::layout::{SlotRecord, EMPTY, LINK_NONE};

/// Lowest index `i >= start` (wrapping to 0 at `maxslots`) whose slot is
/// empty, or `-1` after a full ring traversal.
///
/// # Safety
/// `slots_base` must point to a valid array of `maxslots` slot records.
pub unsafe fn find_avail<const K: usize, const V: usize, const VS: usize>(
    slots_base: *const u8,
    maxslots: u32,
    start: u32,
) -> i32 {
    if maxslots == 0 {
        return LINK_NONE;
    }
    let mut idx = if start >= maxslots { 0 } else { start };
    for _ in 0..maxslots {
        let slot = &*(slots_base.add(idx as usize * SlotRecord::<K, V, VS>::SIZE)
            as *const SlotRecord<K, V, VS>);
        if slot.count == EMPTY {
            return idx as i32;
        }
        idx = if idx + 1 >= maxslots { 0 } else { idx + 1 };
    }
    LINK_NONE
}
