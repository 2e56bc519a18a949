//! prime-assoc: a resizable associative table over borrowed byte keys,
//! with cuckoo or double-hashing collision resolution.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the collision-resolution and growth engine small enough
//!   that each invariant can be checked in one place.
//! - Layers (leaves first):
//!   - `key_codec`: reads a key as NUL-terminated text or a fixed-width
//!     block and compares keys under that reading.
//!   - `hash_pair`: two stateless hash functions reduced modulo the
//!     current capacity.
//!   - `prime`: the next prime table size.
//!   - `slot_table`: fixed arrays of `Option<Entry>`.
//!   - `cuckoo` / `double_hash`: the two resolution engines; insert,
//!     duplicate search and lookup share one traversal each.
//!   - `table`: public `Table`, dispatching to an engine and growing it.
//!
//! Constraints
//! - Borrowed storage: a `Table<'a, V>` holds `&'a [u8]` keys and
//!   `Option<&'a V>` values. It never copies, owns or frees them; the
//!   borrow checker enforces that they outlive the table.
//! - Capacity is always prime, starting at 17 by default.
//! - Unique keys: inserting a present key is a no-op and the first value
//!   is kept.
//! - Single-threaded: every call runs to completion; mutation needs
//!   `&mut Table`, so sharing requires the caller's own lock.
//!
//! Growth
//! - Cuckoo: a displacement chain is bounded by `ceil(log2(capacity))`
//!   evictions. Hitting the bound unwinds the chain, leaving the table as
//!   it was, and the insert is retried in a larger table. A cuckoo table
//!   also grows before its occupancy would exceed one array's capacity.
//! - Double hashing: after the duplicate check, a table holding
//!   `floor(capacity * 2 / 3)` entries grows before placing the new one.
//! - The next capacity is the smallest prime at or above
//!   `capacity * growth_factor`. Every entry is replayed through the same
//!   engine in slot order, then the pending entry is placed. The new table
//!   is fully built before it replaces the old one, so a failed growth
//!   leaves the caller's table untouched.
//! - A failed replay retries at the following size, but never beyond 64
//!   slots per entry held, so hopeless hashing ends in `RehashFailure`
//!   rather than ever larger allocations.
//!
//! Errors
//! - `TableError` is returned for malformed keys, exhausted probes, growth
//!   that cannot place every entry, and bad configuration. Each error is
//!   also reported through `log::error!` as it leaves the table.
//!
//! Notes and non-goals
//! - No removal: neither engine needs tombstones.
//! - No on-disk or wire format.

pub mod config;
mod cuckoo;
pub mod double_hash;
pub mod error;
pub mod hash_pair;
pub mod key_codec;
pub mod prime;
mod slot_table;
mod table;
mod table_proptest;

// Public surface
pub use config::{CollisionStrategy, TableConfig};
pub use error::TableError;
pub use hash_pair::HashPair;
pub use key_codec::KeyKind;
pub use slot_table::Entry;
pub use table::{Insertion, Table};
