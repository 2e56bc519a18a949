//! Table: the public map, its two resolution engines, and growth.

use crate::config::{CollisionStrategy, TableConfig};
use crate::cuckoo::CuckooSlots;
use crate::double_hash::{load_limit, ProbeSlots};
use crate::error::TableError;
use crate::hash_pair::HashPair;
use crate::key_codec::{KeyCodec, KeyKind};
use crate::prime::next_table_size;
use crate::slot_table::Entry;
use core::fmt;
use core::iter;

/// Growth retries never allocate more than this many slots per array for
/// each entry the grown table must hold.
const MAX_SLOTS_PER_ENTRY: usize = 64;

/// Outcome of a successful `Table::insert`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Insertion {
    /// The key was new and is now stored.
    Added,
    /// The key was already stored; the table is unchanged and keeps the
    /// first value.
    AlreadyPresent,
}

enum Slots<'a, V: ?Sized> {
    Cuckoo(CuckooSlots<'a, V>),
    DoubleHashing(ProbeSlots<'a, V>),
}

impl<'a, V: ?Sized> Slots<'a, V> {
    fn new(strategy: CollisionStrategy, capacity: usize) -> Self {
        match strategy {
            CollisionStrategy::Cuckoo => Slots::Cuckoo(CuckooSlots::new(capacity)),
            CollisionStrategy::DoubleHashing => Slots::DoubleHashing(ProbeSlots::new(capacity)),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Slots::Cuckoo(s) => s.capacity(),
            Slots::DoubleHashing(s) => s.capacity(),
        }
    }
}

/// Where an insert left its entry.
enum Placement<'a, V: ?Sized> {
    Stored,
    /// Nothing changed; the table must grow before `entry` fits.
    NeedsGrowth(Entry<'a, V>),
}

/// A resizable map from borrowed byte keys to borrowed values.
///
/// The table stores references only: keys and values must outlive it, and
/// it never copies or frees them. Capacity is always prime. With cuckoo
/// resolution there are two slot arrays of `capacity` slots each; with
/// double hashing there is one.
///
/// Growth replaces the table's contents wholesale inside `insert`; callers
/// holding `&mut Table` see either the old table or the fully migrated one.
pub struct Table<'a, V: ?Sized> {
    codec: KeyCodec,
    hashes: HashPair,
    config: TableConfig,
    slots: Slots<'a, V>,
    len: usize,
}

impl<'a, V: ?Sized> Table<'a, V> {
    /// An empty cuckoo table with default settings.
    pub fn new(key_kind: KeyKind) -> Self {
        Self::from_valid_config(TableConfig::new(key_kind), HashPair::for_kind(key_kind))
    }

    /// An empty double-hashing table with default settings.
    pub fn double_hashing(key_kind: KeyKind) -> Self {
        let config = TableConfig::new(key_kind).with_strategy(CollisionStrategy::DoubleHashing);
        Self::from_valid_config(config, HashPair::for_kind(key_kind))
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        let hashes = HashPair::for_kind(config.key_kind);
        Self::with_hashes(config, hashes)
    }

    /// Like `with_config`, but with caller-chosen hash functions.
    pub fn with_hashes(config: TableConfig, hashes: HashPair) -> Result<Self, TableError> {
        config.validate().map_err(report)?;
        Ok(Self::from_valid_config(config, hashes))
    }

    fn from_valid_config(config: TableConfig, hashes: HashPair) -> Self {
        let capacity = config.initial_capacity;
        Self::empty(config, hashes, capacity)
    }

    fn empty(config: TableConfig, hashes: HashPair, capacity: usize) -> Self {
        Self {
            codec: KeyCodec::new(config.key_kind),
            hashes,
            slots: Slots::new(config.strategy, capacity),
            config,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per array. Always prime.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    pub fn key_kind(&self) -> KeyKind {
        self.codec.kind()
    }

    pub fn strategy(&self) -> CollisionStrategy {
        self.config.strategy
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    fn search(&self, key: &[u8]) -> Option<&Entry<'a, V>> {
        match &self.slots {
            Slots::Cuckoo(s) => s.search(&self.codec, &self.hashes, key),
            Slots::DoubleHashing(s) => s.search(&self.codec, &self.hashes, key),
        }
    }

    /// The stored entry for `key`, distinguishing "absent" from "present
    /// without a value".
    pub fn get_entry(&self, key: &[u8]) -> Result<Option<Entry<'a, V>>, TableError> {
        let key = self.codec.view(key).map_err(report)?;
        Ok(self.search(key).copied())
    }

    /// The value stored for `key`. `None` covers both a missing key and a
    /// key stored without a value.
    ///
    /// The only error is `InvalidArgument`, for a fixed-width key shorter
    /// than the table's width; such a key is never reported as absent.
    pub fn lookup(&self, key: &[u8]) -> Result<Option<&'a V>, TableError> {
        Ok(self.get_entry(key)?.and_then(|e| e.value))
    }

    pub fn contains_key(&self, key: &[u8]) -> Result<bool, TableError> {
        Ok(self.get_entry(key)?.is_some())
    }

    /// Store `key -> value` unless the key is already present, growing the
    /// table first when the collision strategy requires it.
    ///
    /// On error the table is unchanged.
    pub fn insert(&mut self, key: &'a [u8], value: Option<&'a V>) -> Result<Insertion, TableError> {
        let key = self.codec.view(key).map_err(report)?;
        if self.search(key).is_some() {
            return Ok(Insertion::AlreadyPresent);
        }
        let entry = Entry::new(key, value);
        match self.place(entry).map_err(report)? {
            Placement::Stored => self.len += 1,
            Placement::NeedsGrowth(entry) => {
                let grown = self.grown_with(entry).map_err(report)?;
                *self = grown;
            }
        }
        Ok(Insertion::Added)
    }

    /// Try to store a new entry in the current slots without growing.
    fn place(&mut self, entry: Entry<'a, V>) -> Result<Placement<'a, V>, TableError> {
        match &mut self.slots {
            Slots::Cuckoo(s) => {
                if self.len >= s.capacity() {
                    return Ok(Placement::NeedsGrowth(entry));
                }
                match s.insert(&self.hashes, entry) {
                    Ok(_) => Ok(Placement::Stored),
                    Err(displaced) => {
                        log::trace!(
                            "cuckoo chain hit {} displacements at capacity {}",
                            displaced.displacements,
                            s.capacity()
                        );
                        Ok(Placement::NeedsGrowth(displaced.entry))
                    }
                }
            }
            Slots::DoubleHashing(s) => {
                if self.len >= load_limit(s.capacity()) {
                    return Ok(Placement::NeedsGrowth(entry));
                }
                s.insert(&self.hashes, entry)?;
                Ok(Placement::Stored)
            }
        }
    }

    /// Build the next table up holding every current entry followed by
    /// `pending`. If the replay cannot place something, move on to the size
    /// after that. Retries stop after `max_resize_attempts` sizes, or once
    /// the next size would exceed `MAX_SLOTS_PER_ENTRY` slots for each entry
    /// to be held; the first growth is always attempted.
    fn grown_with(&self, pending: Entry<'a, V>) -> Result<Self, TableError> {
        let ceiling = (self.len + 1)
            .max(self.config.initial_capacity)
            .saturating_mul(MAX_SLOTS_PER_ENTRY);
        let mut capacity = self.capacity();
        let mut attempts = 0;
        while attempts < self.config.max_resize_attempts {
            let next_capacity = next_table_size(capacity, self.config.growth_factor)?;
            if attempts > 0 && next_capacity > ceiling {
                log::debug!(
                    "next size {} exceeds {} slots for {} entries, giving up",
                    next_capacity,
                    ceiling,
                    self.len + 1
                );
                break;
            }
            capacity = next_capacity;
            attempts += 1;
            let mut next = Self::empty(self.config.clone(), self.hashes, capacity);
            if next.replay(self, pending) {
                log::debug!(
                    "grew {:?} table from {} to {} slots holding {} entries (attempt {})",
                    self.config.strategy,
                    self.capacity(),
                    capacity,
                    next.len,
                    attempts
                );
                return Ok(next);
            }
            log::debug!("replay into {} slots failed", capacity);
        }
        Err(TableError::RehashFailure { capacity, attempts })
    }

    /// Re-insert every entry of `from`, then `pending`, into this freshly
    /// built table; false as soon as one does not fit.
    fn replay(&mut self, from: &Self, pending: Entry<'a, V>) -> bool {
        for entry in from.entries().copied().chain(iter::once(pending)) {
            let stored = match &mut self.slots {
                Slots::Cuckoo(s) => s.insert(&self.hashes, entry).is_ok(),
                Slots::DoubleHashing(s) => s.insert(&self.hashes, entry).is_ok(),
            };
            if !stored {
                return false;
            }
            self.len += 1;
        }
        true
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &Entry<'a, V>> + '_> {
        match &self.slots {
            Slots::Cuckoo(s) => Box::new(s.entries()),
            Slots::DoubleHashing(s) => Box::new(s.entries()),
        }
    }

    /// Stored entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'a, V>> + '_ {
        self.entries().copied()
    }

    /// `insert` for text tables keyed by `&str`.
    pub fn insert_str(&mut self, key: &'a str, value: Option<&'a V>) -> Result<Insertion, TableError> {
        self.insert(key.as_bytes(), value)
    }

    /// `lookup` for text tables keyed by `&str`.
    pub fn lookup_str(&self, key: &str) -> Result<Option<&'a V>, TableError> {
        self.lookup(key.as_bytes())
    }
}

impl<'a, V: ?Sized> fmt::Debug for Table<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("strategy", &self.config.strategy)
            .field("key_kind", &self.codec.kind())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Fatal-error sink: every error leaving the table is logged once here.
fn report(err: TableError) -> TableError {
    log::error!("{err}");
    err
}
