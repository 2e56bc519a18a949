//! Open addressing with double hashing over a single slot array.

use crate::error::TableError;
use crate::hash_pair::HashPair;
use crate::key_codec::KeyCodec;
use crate::slot_table::{Entry, SlotArray};

/// Probe steps are `PROBE_STEP_PRIME - (index2 % PROBE_STEP_PRIME)`, so
/// always in `1..=13`. Any prime capacity above this makes every step
/// coprime with the capacity and the sequence visits each slot once.
pub const PROBE_STEP_PRIME: usize = 13;

/// Largest occupancy a table of `capacity` slots accepts before growing:
/// `floor(capacity * 2 / 3)`.
#[inline]
pub(crate) fn load_limit(capacity: usize) -> usize {
    capacity / 3 * 2 + capacity % 3 * 2 / 3
}

/// Slot indices visited for one key, at most `capacity` of them.
#[derive(Clone, Debug)]
pub(crate) struct ProbeSequence {
    next: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl ProbeSequence {
    pub(crate) fn new(hashes: &HashPair, key: &[u8], capacity: usize) -> Self {
        let start = hashes.index1(key, capacity);
        let step = PROBE_STEP_PRIME - hashes.index2(key, capacity) % PROBE_STEP_PRIME;
        Self::from_parts(start, step, capacity)
    }

    fn from_parts(start: usize, step: usize, capacity: usize) -> Self {
        Self {
            next: start,
            step: step % capacity,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next += self.step;
        if self.next >= self.capacity {
            self.next -= self.capacity;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

pub(crate) struct ProbeSlots<'a, V: ?Sized> {
    slots: SlotArray<'a, V>,
}

impl<'a, V: ?Sized> ProbeSlots<'a, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: SlotArray::new(capacity),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Walk the key's probe sequence: a match ends the search, as does the
    /// first empty slot or a full cycle.
    pub(crate) fn search(
        &self,
        codec: &KeyCodec,
        hashes: &HashPair,
        key: &[u8],
    ) -> Option<&Entry<'a, V>> {
        for index in ProbeSequence::new(hashes, key, self.capacity()) {
            match self.slots.get(index) {
                None => return None,
                Some(e) if codec.eq(e.key, key) => return Some(e),
                Some(_) => {}
            }
        }
        None
    }

    /// Place `entry` in the first empty slot of its probe sequence and
    /// return that slot's index.
    ///
    /// The caller must have checked that the key is not already present.
    pub(crate) fn insert(
        &mut self,
        hashes: &HashPair,
        entry: Entry<'a, V>,
    ) -> Result<usize, TableError> {
        let cap = self.capacity();
        let target = ProbeSequence::new(hashes, entry.key, cap).find(|&i| !self.slots.is_occupied(i));
        match target {
            Some(index) => {
                self.slots.replace(index, entry);
                Ok(index)
            }
            None => Err(TableError::ProbeExhausted { capacity: cap }),
        }
    }

    /// Occupied entries in index order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<'a, V>> + '_ {
        self.slots.occupied().map(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_codec::KeyKind;

    fn two(_key: &[u8]) -> u64 {
        2
    }

    fn five(_key: &[u8]) -> u64 {
        5
    }

    fn sixteen(_key: &[u8]) -> u64 {
        16
    }

    #[test]
    fn load_limit_is_floor_two_thirds() {
        assert_eq!(load_limit(17), 11);
        assert_eq!(load_limit(71), 47);
        assert_eq!(load_limit(3), 2);
        assert_eq!(load_limit(293), 195);
    }

    #[test]
    fn sequence_visits_every_slot_once() {
        let hashes = HashPair::for_kind(KeyKind::Text);
        for key in [&b"Hello"[..], b"goodbye", b"ink", b"minx", b"trifle"] {
            let mut seen: Vec<usize> = ProbeSequence::new(&hashes, key, 17).collect();
            assert_eq!(seen.len(), 17);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 17);
        }
    }

    #[test]
    fn steps_follow_the_secondary_hash() {
        // index2 == 2 -> step 11: 2, 13, 7, 1, ...
        let seq: Vec<usize> = ProbeSequence::new(&HashPair::new(two, two), b"k", 17)
            .take(4)
            .collect();
        assert_eq!(seq, [2, 13, 7, 1]);
        // index2 == 5 -> step 8: 5, 13, 4
        let seq: Vec<usize> = ProbeSequence::new(&HashPair::new(five, five), b"k", 17)
            .take(3)
            .collect();
        assert_eq!(seq, [5, 13, 4]);
        // index2 == 16 -> step 10: 16, 9
        let seq: Vec<usize> = ProbeSequence::new(&HashPair::new(sixteen, sixteen), b"k", 17)
            .take(2)
            .collect();
        assert_eq!(seq, [16, 9]);
    }

    #[test]
    fn colliding_keys_take_successive_probe_slots() {
        let hashes = HashPair::new(two, two);
        let codec = KeyCodec::new(KeyKind::Text);
        let mut s: ProbeSlots<'_, str> = ProbeSlots::new(17);
        assert_eq!(s.insert(&hashes, Entry::new(b"a", Some("va"))).unwrap(), 2);
        assert_eq!(s.insert(&hashes, Entry::new(b"b", Some("vb"))).unwrap(), 13);
        assert_eq!(s.insert(&hashes, Entry::new(b"c", None)).unwrap(), 7);

        assert_eq!(s.search(&codec, &hashes, b"b").unwrap().value, Some("vb"));
        assert!(s.search(&codec, &hashes, b"c").unwrap().value.is_none());
        assert!(s.search(&codec, &hashes, b"d").is_none());
    }

    #[test]
    fn full_table_reports_exhaustion_and_misses_end_after_one_cycle() {
        let hashes = HashPair::new(two, two);
        let codec = KeyCodec::new(KeyKind::Text);
        let keys: Vec<[u8; 1]> = (0u8..17).map(|b| [b'A' + b]).collect();
        let mut s: ProbeSlots<'_, u8> = ProbeSlots::new(17);
        for k in &keys {
            s.insert(&hashes, Entry::new(k, None)).unwrap();
        }
        assert_eq!(s.entries().count(), 17);
        match s.insert(&hashes, Entry::new(b"z", None)) {
            Err(TableError::ProbeExhausted { capacity: 17 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(s.search(&codec, &hashes, b"z").is_none());
        assert!(s.search(&codec, &hashes, b"Q").is_some());
    }
}
