//! The slot-level storage machine (spec §2 items 4-9, §4).
//!
//! `HashTable<K, V, VS>` plays the role the teacher's `ShmCache` plays
//! over its bucket+slab design: it recomputes the slot base from the
//! header on every call and mutates the region purely through index
//! arithmetic. Unlike the teacher, there is no separate bucket array or
//! free list — placement, collision chaining, and value spilling all
//! happen directly inside one dense slot ring, per spec §2.
//!
//! `K` is the inline key byte-width, `V` the inline value width carried
//! by a head/collision slot, `VS` the inline value width carried by a
//! spill fragment. All three are compile-time constants of the region's
//! ABI (spec §6) and must match between every process attaching it.
use crate::error::{Error, Result};
use crate::hash::{md5_digest, murmur3_32};
use crate::layout::{
    Header, SlotRecord, COLLISION_MEMBER, EMPTY, HEADER_SIZE, LINK_NONE, SPILL_FRAGMENT,
};
use crate::probe;
use crate::region::Region;

/// `(key, value, slot index)` yielded by [`HashTable::getnext`].
pub type Entry = (Vec<u8>, Vec<u8>, i32);

/// A handle bound to one region (spec §3 "Ownership & lifecycle": the
/// handle is the only heap state the core creates; dropping it never
/// touches the region).
pub struct HashTable<const K: usize, const V: usize, const VS: usize> {
    region: Region,
}

impl<const K: usize, const V: usize, const VS: usize> HashTable<K, V, VS> {
    /// Bytes a region of `maxslots` slots occupies (spec §4.1, §6
    /// `region_bytes`).
    pub fn region_bytes(maxslots: u32) -> usize {
        crate::layout::region_bytes::<K, V, VS>(maxslots)
    }

    /// Allocate and own a fresh region sized for `maxslots` slots, and
    /// initialize it. The common single-process convenience over `open`.
    pub fn create(maxslots: u32) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let _ = SlotRecord::<K, V, VS>::NONZERO_WIDTHS;
        if maxslots < 1 {
            return Err(Error::InvalidRegion);
        }
        let region = Region::allocate(Self::region_bytes(maxslots));
        let table = HashTable { region };
        let header = table.header_mut();
        header.maxslots = maxslots as i32;
        header.usedslots = 0;
        header.num = 0;
        Ok(table)
    }

    /// The literal ABI entry point (spec §6 `open`): initializes when
    /// `bytes > 0`, re-attaches (trusting the header already present)
    /// when `bytes == 0`.
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes for `bytes` bytes (on
    /// the init path), or for at least the byte length the existing
    /// header implies (on the re-attach path), for the entire lifetime
    /// of the returned handle. The caller must serialize access to the
    /// region with any other attached process (spec §5).
    pub unsafe fn open(ptr: *mut u8, bytes: usize) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let _ = SlotRecord::<K, V, VS>::NONZERO_WIDTHS;
        if bytes > 0 {
            let maxslots = crate::layout::maxslots_for_bytes::<K, V, VS>(bytes);
            if maxslots < 1 {
                return Err(Error::InvalidRegion);
            }
            std::ptr::write_bytes(ptr, 0, bytes);
            let region = Region::from_raw_parts(ptr, bytes);
            let table = HashTable { region };
            let header = table.header_mut();
            header.maxslots = maxslots as i32;
            header.usedslots = 0;
            header.num = 0;
            Ok(table)
        } else {
            let header = &*(ptr as *const Header);
            if header.maxslots < 1 {
                return Err(Error::InvalidRegion);
            }
            let len = crate::layout::region_bytes::<K, V, VS>(header.maxslots as u32);
            let region = Region::from_raw_parts(ptr, len);
            Ok(HashTable { region })
        }
    }

    /// Re-attach to a region a prior `create`/`open` call already
    /// initialized, without touching its contents.
    ///
    /// # Safety
    /// `region` must hold a valid header written by an earlier call with
    /// the same `K`, `V`, `VS`.
    pub unsafe fn attach(region: Region) -> Result<Self> {
        let header = &*(region.as_ptr() as *const Header);
        if header.maxslots < 1 {
            return Err(Error::InvalidRegion);
        }
        Ok(HashTable { region })
    }

    fn header(&self) -> &Header {
        unsafe { &*(self.region.as_ptr() as *const Header) }
    }

    #[allow(clippy::mut_from_ref)]
    fn header_mut(&self) -> &mut Header {
        unsafe { &mut *(self.region.as_ptr() as *mut Header) }
    }

    fn slots_base(&self) -> *mut u8 {
        unsafe { self.region.as_ptr().add(HEADER_SIZE) }
    }

    /// # Safety: `idx` must be in `0..maxslots`.
    unsafe fn slot(&self, idx: i32) -> &SlotRecord<K, V, VS> {
        &*(self.slots_base().add(idx as usize * SlotRecord::<K, V, VS>::SIZE)
            as *const SlotRecord<K, V, VS>)
    }

    /// # Safety: `idx` must be in `0..maxslots`.
    #[allow(clippy::mut_from_ref)]
    unsafe fn slot_mut(&self, idx: i32) -> &mut SlotRecord<K, V, VS> {
        &mut *(self.slots_base().add(idx as usize * SlotRecord::<K, V, VS>::SIZE)
            as *mut SlotRecord<K, V, VS>)
    }

    fn next_index(&self, idx: i32) -> i32 {
        let maxslots = self.header().maxslots;
        if idx + 1 >= maxslots {
            0
        } else {
            idx + 1
        }
    }

    unsafe fn find_avail(&self, start: u32) -> i32 {
        probe::find_avail::<K, V, VS>(self.slots_base(), self.header().maxslots as u32, start)
    }

    fn home_index(&self, key: &[u8]) -> Result<i32> {
        let maxslots = self.header().maxslots as u32;
        if maxslots == 0 {
            return Err(Error::InvalidRegion);
        }
        Ok((murmur3_32(key) % maxslots) as i32)
    }

    /// Spec §3 "Keys": length match, then either exact inline bytes or
    /// truncated-prefix + MD5 digest.
    unsafe fn key_matches(&self, slot: &SlotRecord<K, V, VS>, key: &[u8]) -> bool {
        let keylen = slot.body.head.keylen as usize;
        if keylen != key.len() {
            return false;
        }
        if keylen <= K {
            &slot.body.head.key[..keylen] == key
        } else {
            if slot.body.head.key[..K] != key[..K] {
                return false;
            }
            slot.body.head.keymd5 == md5_digest(key)
        }
    }

    /// Spec §4.4 `get_idx`.
    unsafe fn get_idx(&self, home: i32, key: &[u8]) -> i32 {
        let home_slot = self.slot(home);
        if home_slot.count <= 0 {
            return LINK_NONE;
        }
        let target = home_slot.count;
        let maxslots = self.header().maxslots;
        let mut visited = 0i32;
        let mut idx = home;
        for _ in 0..maxslots {
            let slot = self.slot(idx);
            if slot.hash == home && (slot.count > 0 || slot.count == COLLISION_MEMBER) {
                visited += 1;
                if self.key_matches(slot, key) {
                    return idx;
                }
                if visited == target {
                    break;
                }
            }
            idx = self.next_index(idx);
        }
        LINK_NONE
    }

    /// Spec §4.5 `get_data`: two passes, sum then copy.
    unsafe fn get_data(&self, idx: i32) -> Vec<u8> {
        let mut total = 0usize;
        let mut cur = idx;
        loop {
            let slot = self.slot(cur);
            total += slot.size as usize;
            if slot.link == LINK_NONE {
                break;
            }
            cur = slot.link;
        }

        let mut buf = Vec::with_capacity(total);
        let mut cur = idx;
        loop {
            let slot = self.slot(cur);
            let sz = slot.size as usize;
            if cur == idx {
                buf.extend_from_slice(&slot.body.head.value[..sz]);
            } else {
                buf.extend_from_slice(&slot.body.spill.value[..sz]);
            }
            if slot.link == LINK_NONE {
                break;
            }
            cur = slot.link;
        }
        buf
    }

    /// Free every slot in the value chain rooted at `idx` (head plus any
    /// spill fragments), decrementing `usedslots` per slot and `num`
    /// once. Shared by the NO_SPACE unwind in `put_data` and every
    /// removal case in §4.8 that says "remove the payload chain".
    unsafe fn free_value_chain(&mut self, idx: i32) {
        let mut cur = idx;
        loop {
            let slot = self.slot_mut(cur);
            let next = slot.link;
            slot.count = EMPTY;
            slot.hash = 0;
            slot.link = LINK_NONE;
            slot.size = 0;
            self.header_mut().usedslots -= 1;
            if next == LINK_NONE {
                break;
            }
            cur = next;
        }
        self.header_mut().num -= 1;
    }

    /// Spec §4.7 `put_data`. Precondition: `slots[idx].count == 0`.
    unsafe fn put_data(&mut self, idx: i32, home: i32, key: &[u8], value: &[u8], count: i32) -> Result<()> {
        debug_assert_eq!(self.slot(idx).count, EMPTY);

        let slot = self.slot_mut(idx);
        let klen = key.len().min(K);
        slot.body.head.key = [0u8; K];
        slot.body.head.key[..klen].copy_from_slice(&key[..klen]);
        slot.body.head.keylen = key.len() as u32;
        slot.body.head.keymd5 = if key.len() > K { md5_digest(key) } else { [0u8; 16] };
        slot.count = count;
        slot.hash = home;
        slot.link = LINK_NONE;

        let head_n = value.len().min(V);
        slot.body.head.value = [0u8; V];
        slot.body.head.value[..head_n].copy_from_slice(&value[..head_n]);
        slot.size = head_n as i32;

        self.header_mut().num += 1;
        self.header_mut().usedslots += 1;

        let mut written = head_n;
        let mut current = idx;
        while written < value.len() {
            let avail = self.find_avail((current as u32) + 1);
            if avail == LINK_NONE {
                log::warn!("spill chain ran out of empty slots after {written} of {} bytes", value.len());
                self.free_value_chain(idx);
                return Err(Error::NoSpace);
            }

            let chunk = (value.len() - written).min(VS);
            let spill = self.slot_mut(avail);
            spill.count = SPILL_FRAGMENT;
            spill.hash = current;
            spill.link = LINK_NONE;
            spill.body.spill.value = [0u8; VS];
            spill.body.spill.value[..chunk].copy_from_slice(&value[written..written + chunk]);
            spill.size = chunk as i32;

            self.slot_mut(current).link = avail;
            self.header_mut().usedslots += 1;
            written += chunk;
            current = avail;
        }
        Ok(())
    }

    /// Spec §4.6 case C: relocate the squatter occupying `home` and
    /// repair its links so the home slot is free for the new head.
    unsafe fn evict_home(&mut self, home: i32) -> Result<()> {
        let j = self.find_avail((home as u32) + 1);
        if j == LINK_NONE {
            return Err(Error::NoSpace);
        }

        let occupant = *self.slot(home);
        *self.slot_mut(j) = occupant;
        self.header_mut().usedslots += 1;

        let home_slot = self.slot_mut(home);
        home_slot.count = EMPTY;
        home_slot.hash = 0;
        home_slot.link = LINK_NONE;
        home_slot.size = 0;
        self.header_mut().usedslots -= 1;

        if occupant.count == SPILL_FRAGMENT {
            let pred = occupant.hash;
            self.slot_mut(pred).link = j;
            if occupant.link != LINK_NONE {
                self.slot_mut(occupant.link).hash = j;
            }
            log::trace!("relocated spill fragment {home} -> {j}, repaired prev/next links");
        } else {
            log::trace!("relocated collision member {home} -> {j}");
        }
        Ok(())
    }

    /// Spec §4.6: the four-case insertion decision.
    fn insert_at_home(&mut self, home: i32, key: &[u8], value: &[u8]) -> Result<()> {
        loop {
            let count = unsafe { self.slot(home).count };
            if count == EMPTY {
                unsafe { self.put_data(home, home, key, value, 1) }?;
                return Ok(());
            } else if count > 0 {
                let existing = unsafe { self.get_idx(home, key) };
                if existing != LINK_NONE {
                    self.remove_by_idx(existing)?;
                    continue;
                }
                let j = unsafe { self.find_avail((home as u32) + 1) };
                if j == LINK_NONE {
                    return Err(Error::NoSpace);
                }
                unsafe { self.put_data(j, home, key, value, COLLISION_MEMBER) }?;
                unsafe { self.slot_mut(home).count += 1 };
                return Ok(());
            } else {
                unsafe { self.evict_home(home) }?;
            }
        }
    }

    /// Insert or overwrite `key` with `value` (spec §4.6, §4.7).
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let home = self.home_index(key)?;
        self.insert_at_home(home, key, value)
    }

    /// Look up `key` and return an owned copy of its value.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let home = self.home_index(key)?;
        let idx = unsafe { self.get_idx(home, key) };
        if idx == LINK_NONE {
            return Err(Error::NotFound);
        }
        Ok(unsafe { self.get_data(idx) })
    }

    /// Any slot `k != home` with `count == -1 && hash == home` (spec
    /// §4.8 case `count > 1`: "locate any slot k").
    fn find_collision_sibling(&self, home: i32) -> Option<i32> {
        let maxslots = self.header().maxslots;
        for k in 0..maxslots {
            if k == home {
                continue;
            }
            let slot = unsafe { self.slot(k) };
            if slot.count == COLLISION_MEMBER && slot.hash == home {
                return Some(k);
            }
        }
        None
    }

    /// Spec §4.8 `remove_by_idx`.
    pub fn remove_by_idx(&mut self, idx: i32) -> Result<()> {
        if idx < 0 || idx >= self.header().maxslots {
            return Err(Error::InvalidArg);
        }
        unsafe { self.remove_by_idx_unchecked(idx) }
    }

    unsafe fn remove_by_idx_unchecked(&mut self, i: i32) -> Result<()> {
        let count = self.slot(i).count;
        if count == 1 {
            self.free_value_chain(i);
            return Ok(());
        }
        if count > 1 {
            let old_count = count;
            let sibling = match self.find_collision_sibling(i) {
                Some(k) => k,
                None => {
                    log::warn!("head {i} claims count {old_count} but no collision member points at it");
                    return Err(Error::Corrupt);
                }
            };
            self.free_value_chain(i);
            let occupant = *self.slot(sibling);
            *self.slot_mut(i) = occupant;
            self.slot_mut(i).count = old_count - 1;
            let k_slot = self.slot_mut(sibling);
            k_slot.count = EMPTY;
            k_slot.hash = 0;
            k_slot.link = LINK_NONE;
            k_slot.size = 0;
            let first_spill = self.slot(i).link;
            if first_spill != LINK_NONE {
                self.slot_mut(first_spill).hash = i;
            }
            return Ok(());
        }
        if count == COLLISION_MEMBER {
            let home = self.slot(i).hash;
            if self.slot(home).count < 1 {
                log::warn!("collision member {i} points at home {home} with non-positive count");
                return Err(Error::Corrupt);
            }
            self.slot_mut(home).count -= 1;
            self.free_value_chain(i);
            return Ok(());
        }
        Err(Error::NotFound)
    }

    /// Remove `key` (spec §4.8 `remove`).
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        let home = self.home_index(key)?;
        let idx = unsafe { self.get_idx(home, key) };
        if idx == LINK_NONE {
            return Err(Error::NotFound);
        }
        unsafe { self.remove_by_idx_unchecked(idx) }
    }

    /// Spec §4.9 `getnext`. Returns `Ok(None)` at the end of the ring
    /// (the ABI's `END`). After removing `found_index` mid-iteration,
    /// the caller must rewind `*cursor = found_index` before the next
    /// call, since a `count > 1` removal can relocate a sibling into the
    /// vacated index.
    pub fn getnext(&self, cursor: &mut i32) -> Result<Option<Entry>> {
        let maxslots = self.header().maxslots;
        let mut idx = if *cursor < 0 { 0 } else { *cursor };
        while idx < maxslots {
            let slot = unsafe { self.slot(idx) };
            if slot.count != EMPTY && slot.count != SPILL_FRAGMENT {
                let keylen = (unsafe { slot.body.head.keylen } as usize).min(K);
                let key = unsafe { slot.body.head.key[..keylen].to_vec() };
                let value = unsafe { self.get_data(idx) };
                *cursor = idx + 1;
                return Ok(Some((key, value, idx)));
            }
            idx += 1;
        }
        Ok(None)
    }

    /// Spec §4.10 `size`: `(num, usedslots, maxslots)`.
    pub fn size(&self) -> (i32, i32, i32) {
        let h = self.header();
        (h.num, h.usedslots, h.maxslots)
    }

    /// Spec §4.10 `clear`.
    pub fn clear(&mut self) {
        let maxslots = self.header().maxslots as usize;
        unsafe {
            std::ptr::write_bytes(self.slots_base(), 0, maxslots * SlotRecord::<K, V, VS>::SIZE);
        }
        let header = self.header_mut();
        header.usedslots = 0;
        header.num = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type T = HashTable<16, 32, 32>;

    #[test]
    fn scenario_basic() {
        let mut t = T::create(10).unwrap();
        t.put(b"e1", b"a").unwrap();
        t.put(b"e2", b"b").unwrap();
        t.put(b"e3", b"c").unwrap();
        assert_eq!(t.size().0, 3);
        assert_eq!(t.get(b"e2").unwrap(), b"b");
    }

    /// Find two distinct keys whose murmur3 home collides mod `maxslots`.
    fn colliding_keys(maxslots: u32) -> (Vec<u8>, Vec<u8>) {
        use std::collections::HashMap;
        let mut seen: HashMap<u32, Vec<u8>> = HashMap::new();
        for i in 0u32.. {
            let k = format!("k{i}").into_bytes();
            let home = murmur3_32(&k) % maxslots;
            if let Some(other) = seen.get(&home) {
                return (other.clone(), k);
            }
            seen.insert(home, k);
            if i > 100_000 {
                panic!("failed to find a collision");
            }
        }
        unreachable!()
    }

    #[test]
    fn scenario_collision() {
        let mut t = T::create(10).unwrap();
        let (a, b) = colliding_keys(10);
        t.put(&a, b"va").unwrap();
        t.put(&b, b"vb").unwrap();
        assert_eq!(t.get(&a).unwrap(), b"va");
        assert_eq!(t.get(&b).unwrap(), b"vb");
        assert_eq!(t.size().0, 2);

        let home = (murmur3_32(&a) % 10) as i32;
        assert_eq!(unsafe { t.slot(home) }.count, 2);
    }

    #[test]
    fn scenario_home_eviction() {
        let _ = env_logger::try_init();
        let mut t = T::create(10).unwrap();
        // Insert several keys whose home collides at the same slot so the
        // second and third keys occupy whatever their own home doesn't,
        // then insert a key whose own home is that now-squatted slot.
        let (a, b) = colliding_keys(10);
        t.put(&a, b"va").unwrap();
        t.put(&b, b"vb").unwrap();

        let home_b = (murmur3_32(&b) % 10) as i32;
        // find the key whose home equals `b`'s collision-member slot index
        let squatted_slot = unsafe { t.get_idx(home_b, &b) };
        assert_ne!(squatted_slot, home_b);

        // Now find a key whose home equals that physical slot index.
        let mut third = None;
        for i in 0u32..100_000 {
            let k = format!("z{i}").into_bytes();
            if (murmur3_32(&k) % 10) as i32 == squatted_slot {
                third = Some(k);
                break;
            }
        }
        let third = third.expect("found a key homing to the squatted slot");
        t.put(&third, b"vc").unwrap();

        assert_eq!(t.get(&a).unwrap(), b"va");
        assert_eq!(t.get(&b).unwrap(), b"vb");
        assert_eq!(t.get(&third).unwrap(), b"vc");
        assert_eq!(t.size().0, 3);
    }

    #[test]
    fn scenario_big_value() {
        type Big = HashTable<16, 32, 32>;
        let mut t = Big::create(16).unwrap();
        let value: Vec<u8> = (0..100u8).collect();
        let before = t.size();
        t.put(b"big", &value).unwrap();
        let after = t.size();
        assert_eq!(after.1 - before.1, 4); // head + 3 spill fragments
        assert_eq!(after.0 - before.0, 1);
        assert_eq!(t.get(b"big").unwrap(), value);
    }

    #[test]
    fn scenario_truncated_key() {
        type Trunc = HashTable<16, 16, 16>;
        let mut t = Trunc::create(32).unwrap();
        let mut k1 = vec![b'x'; 16];
        k1.extend_from_slice(b"AAAAAAAAAAAAAAAA");
        let mut k2 = vec![b'x'; 16];
        k2.extend_from_slice(b"BBBBBBBBBBBBBBBB");
        t.put(&k1, b"v1").unwrap();
        t.put(&k2, b"v2").unwrap();
        assert_eq!(t.get(&k1).unwrap(), b"v1");
        assert_eq!(t.get(&k2).unwrap(), b"v2");
        assert_eq!(t.size().0, 2);
    }

    #[test]
    fn scenario_full_table() {
        let mut t = T::create(3).unwrap();
        t.put(b"a", b"1").unwrap();
        t.put(b"b", b"2").unwrap();
        t.put(b"c", b"3").unwrap();
        let before = t.size();
        let err = t.put(b"d", b"4").unwrap_err();
        assert_eq!(err, Error::NoSpace);
        assert_eq!(t.size(), before);
    }

    #[test]
    fn last_write_wins() {
        let mut t = T::create(10).unwrap();
        t.put(b"k", b"v1").unwrap();
        t.put(b"k", b"v2").unwrap();
        assert_eq!(t.get(b"k").unwrap(), b"v2");
        assert_eq!(t.size().0, 1);
    }

    #[test]
    fn remove_then_miss() {
        let mut t = T::create(10).unwrap();
        t.put(b"k", b"v").unwrap();
        t.remove(b"k").unwrap();
        assert_eq!(t.get(b"k").unwrap_err(), Error::NotFound);
        assert_eq!(t.size().0, 0);
    }

    #[test]
    fn iteration_completeness_with_removal() {
        let mut t = T::create(16).unwrap();
        for i in 0..10 {
            t.put(format!("k{i}").as_bytes(), format!("v{i}").as_bytes()).unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        let mut cursor = 0;
        while let Some((key, _value, idx)) = t.getnext(&mut cursor).unwrap() {
            seen.insert(key);
            if seen.len() == 3 {
                t.remove_by_idx(idx).unwrap();
                cursor = idx; // rewind per the removal-during-iteration contract
            }
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(t.size().0, 9);
    }

    #[test]
    fn clear_resets_counts_but_keeps_capacity() {
        let mut t = T::create(10).unwrap();
        t.put(b"a", b"1").unwrap();
        t.put(b"b", b"2").unwrap();
        t.clear();
        assert_eq!(t.size(), (0, 0, 10));
        assert_eq!(t.get(b"a").unwrap_err(), Error::NotFound);
    }

    #[test]
    fn reattach_sees_same_data() {
        let mut t = T::create(10).unwrap();
        t.put(b"k", b"v").unwrap();
        let ptr = t.region.as_ptr();
        // SAFETY: `t` keeps the region alive for the duration of this call.
        let reattached = unsafe { T::open(ptr, 0) }.unwrap();
        assert_eq!(reattached.get(b"k").unwrap(), b"v");
    }
}

#[cfg(test)]
mod laws {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    type T = HashTable<16, 32, 32>;

    fn small_key() -> impl Strategy<Value = Vec<u8>> {
        vec(any::<u8>(), 1..12)
    }

    fn small_value() -> impl Strategy<Value = Vec<u8>> {
        vec(any::<u8>(), 0..20)
    }

    proptest! {
        /// Spec §8: a key just put is readable back with the same bytes.
        #[test]
        fn round_trip(key in small_key(), value in small_value()) {
            let mut t = T::create(32).unwrap();
            if t.put(&key, &value).is_ok() {
                prop_assert_eq!(t.get(&key).unwrap(), value);
            }
        }

        /// Spec §8: the second `put` of a key is what `get` returns, and
        /// `num` does not grow from the overwrite.
        #[test]
        fn last_write_wins_property(key in small_key(), v1 in small_value(), v2 in small_value()) {
            let mut t = T::create(32).unwrap();
            if t.put(&key, &v1).is_ok() {
                let before = t.size().0;
                if t.put(&key, &v2).is_ok() {
                    prop_assert_eq!(t.get(&key).unwrap(), v2);
                    prop_assert_eq!(t.size().0, before);
                }
            }
        }

        /// Spec §8: removing a key makes it unreadable and shrinks `num`
        /// by exactly one.
        #[test]
        fn remove_then_miss_property(key in small_key(), value in small_value()) {
            let mut t = T::create(32).unwrap();
            if t.put(&key, &value).is_ok() {
                let before = t.size().0;
                t.remove(&key).unwrap();
                prop_assert_eq!(t.get(&key).unwrap_err(), Error::NotFound);
                prop_assert_eq!(t.size().0, before - 1);
            }
        }

        /// Spec §8: a full `getnext` sweep visits every live key exactly
        /// once, independent of insertion order.
        #[test]
        fn iteration_completeness_property(keys in vec(small_key(), 1..8)) {
            let mut t = T::create(64).unwrap();
            let mut inserted = std::collections::HashSet::new();
            for (i, key) in keys.iter().enumerate() {
                if t.put(key, format!("v{i}").as_bytes()).is_ok() {
                    inserted.insert(key.clone());
                }
            }

            let mut seen = std::collections::HashSet::new();
            let mut cursor = 0;
            while let Some((key, _value, _idx)) = t.getnext(&mut cursor).unwrap() {
                seen.insert(key);
            }
            prop_assert_eq!(seen, inserted);
        }

        /// Spec §4.1 / §6: `region_bytes` is strictly increasing in
        /// `maxslots`, and `maxslots_for_bytes` inverts it exactly at an
        /// exact-fit byte count.
        #[test]
        fn capacity_monotone_and_invertible(a in 1u32..200, b in 1u32..200) {
            let ra = T::region_bytes(a);
            let rb = T::region_bytes(b);
            prop_assert_eq!(ra < rb, a < b);
            prop_assert_eq!(crate::layout::maxslots_for_bytes::<16, 32, 32>(ra), a);
        }
    }
}
