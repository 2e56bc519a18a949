//! SlotArray: fixed-capacity storage of borrowed key/value references.

use core::fmt;

/// One stored association. Both references are borrowed from the caller;
/// the table never copies or frees what they point to.
pub struct Entry<'a, V: ?Sized> {
    /// Significant key bytes (already cut to the table's key kind).
    pub key: &'a [u8],
    pub value: Option<&'a V>,
}

impl<'a, V: ?Sized> Entry<'a, V> {
    pub(crate) fn new(key: &'a [u8], value: Option<&'a V>) -> Self {
        Self { key, value }
    }
}

// Manual impls: a derive would demand `V: Clone`, but only the references
// are copied.
impl<'a, V: ?Sized> Clone for Entry<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V: ?Sized> Copy for Entry<'a, V> {}

impl<'a, V: ?Sized + fmt::Debug> fmt::Debug for Entry<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// A fixed number of slots, each empty or holding one `Entry`.
///
/// Allocation fills every slot with `None`, so a fresh array is entirely
/// empty; capacity never changes after construction.
pub(crate) struct SlotArray<'a, V: ?Sized> {
    slots: Box<[Option<Entry<'a, V>>]>,
}

impl<'a, V: ?Sized> SlotArray<'a, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&Entry<'a, V>> {
        self.slots[index].as_ref()
    }

    #[inline]
    pub(crate) fn is_occupied(&self, index: usize) -> bool {
        self.slots[index].is_some()
    }

    /// Store `entry` at `index`, returning the previous occupant.
    #[inline]
    pub(crate) fn replace(&mut self, index: usize, entry: Entry<'a, V>) -> Option<Entry<'a, V>> {
        self.slots[index].replace(entry)
    }

    /// Occupied slots in index order.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, &Entry<'a, V>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }
}
