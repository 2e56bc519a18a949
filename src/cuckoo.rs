//! Cuckoo resolution over two slot arrays.
//!
//! Every stored key lives either at `t1[index1(key)]` or at
//! `t2[index2(key)]`, never anywhere else. Insert keeps that true by
//! evicting the occupant of a full slot and moving it to its slot in the
//! other array, alternating until a chain ends in an empty slot or the
//! displacement bound is hit.

use crate::hash_pair::HashPair;
use crate::key_codec::KeyCodec;
use crate::slot_table::{Entry, SlotArray};

/// Returned when a displacement chain hits its bound. The chain has been
/// unwound, so the arrays are exactly as before the call and `entry` is the
/// entry that was being inserted.
pub(crate) struct Displaced<'a, V: ?Sized> {
    pub(crate) entry: Entry<'a, V>,
    pub(crate) displacements: u32,
}

pub(crate) struct CuckooSlots<'a, V: ?Sized> {
    t1: SlotArray<'a, V>,
    t2: SlotArray<'a, V>,
}

/// `ceil(log2(capacity))`, and at least one.
pub(crate) fn max_displacements(capacity: usize) -> u32 {
    if capacity <= 2 {
        return 1;
    }
    usize::BITS - (capacity - 1).leading_zeros()
}

impl<'a, V: ?Sized> CuckooSlots<'a, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            t1: SlotArray::new(capacity),
            t2: SlotArray::new(capacity),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.t1.capacity()
    }

    /// Look at the key's two candidate slots and nothing else.
    pub(crate) fn search(
        &self,
        codec: &KeyCodec,
        hashes: &HashPair,
        key: &[u8],
    ) -> Option<&Entry<'a, V>> {
        let cap = self.capacity();
        let candidates = [
            self.t1.get(hashes.index1(key, cap)),
            self.t2.get(hashes.index2(key, cap)),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|e| codec.eq(e.key, key))
    }

    #[inline]
    fn slot_for(
        &mut self,
        hashes: &HashPair,
        key: &[u8],
        in_first: bool,
    ) -> (&mut SlotArray<'a, V>, usize) {
        let cap = self.capacity();
        if in_first {
            (&mut self.t1, hashes.index1(key, cap))
        } else {
            (&mut self.t2, hashes.index2(key, cap))
        }
    }

    /// Place `entry`, displacing occupants as needed, and return the number
    /// of evictions performed. Once the count reaches
    /// `max_displacements(capacity)` the chain is undone and the entry is
    /// handed back.
    ///
    /// The caller must have checked that the key is not already present.
    pub(crate) fn insert(
        &mut self,
        hashes: &HashPair,
        entry: Entry<'a, V>,
    ) -> Result<u32, Displaced<'a, V>> {
        let limit = max_displacements(self.capacity());
        let mut pending = entry;
        let mut displacements = 0u32;
        let mut in_first = true;
        loop {
            let (slots, index) = self.slot_for(hashes, pending.key, in_first);
            if slots.is_occupied(index) {
                displacements += 1;
                if displacements >= limit {
                    let entry = self.unwind(hashes, pending, in_first, displacements - 1);
                    return Err(Displaced {
                        entry,
                        displacements,
                    });
                }
            }
            match slots.replace(index, pending) {
                None => return Ok(displacements),
                Some(evicted) => pending = evicted,
            }
            in_first = !in_first;
        }
    }

    /// Reverse `swaps` evictions. `held` is the entry the chain was about to
    /// place into the array named by `in_first`; each stored entry sits at
    /// its own index, so every step of the chain can be recomputed from the
    /// entry being put back.
    fn unwind(
        &mut self,
        hashes: &HashPair,
        mut held: Entry<'a, V>,
        mut in_first: bool,
        swaps: u32,
    ) -> Entry<'a, V> {
        for _ in 0..swaps {
            in_first = !in_first;
            let (slots, index) = self.slot_for(hashes, held.key, in_first);
            held = slots
                .replace(index, held)
                .expect("every slot on a displacement chain is occupied");
        }
        held
    }

    /// Occupied entries in index order, `t1[i]` before `t2[i]`.
    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<'a, V>> + '_ {
        (0..self.capacity()).flat_map(move |i| self.t1.get(i).into_iter().chain(self.t2.get(i)))
    }
}
