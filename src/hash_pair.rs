//! The two independent hash functions shared by both collision strategies.
//!
//! Both functions see only the key's significant bytes (see `KeyCodec::view`)
//! and carry no state, so the same key lands on the same indices every time
//! a table of a given capacity is built. That is what makes rehashing
//! reproducible.

use crate::key_codec::KeyKind;
use core::hash::Hasher;
use twox_hash::XxHash64;

/// Seeds of the two xxHash64 functions used for fixed-width keys.
const PRIMARY_SEED: u64 = 42;
const SECONDARY_SEED: u64 = 123;

/// A raw 64-bit hash over a key's significant bytes.
pub type HashFn = fn(&[u8]) -> u64;

/// Primary and secondary hash functions, reduced modulo a capacity.
#[derive(Copy, Clone, Debug)]
pub struct HashPair {
    first: HashFn,
    second: HashFn,
}

impl HashPair {
    /// Build a pair from two caller-supplied functions. They must be
    /// deterministic; for cuckoo tables they should also rarely agree.
    pub fn new(first: HashFn, second: HashFn) -> Self {
        Self { first, second }
    }

    /// The default pair for a key kind. Text keys use djb2 and a base-37
    /// polynomial. Fixed-width keys use two differently seeded xxHash64
    /// functions, except that 4-byte keys take the integer avalanche mix as
    /// their primary hash.
    pub fn for_kind(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Text => Self::new(djb2, poly37),
            KeyKind::FixedWidth(n) if n.get() == 4 => Self::new(avalanche_u32, xxh64_secondary),
            KeyKind::FixedWidth(_) => Self::new(xxh64_primary, xxh64_secondary),
        }
    }

    #[inline]
    pub fn index1(&self, key: &[u8], capacity: usize) -> usize {
        reduce((self.first)(key), capacity)
    }

    #[inline]
    pub fn index2(&self, key: &[u8], capacity: usize) -> usize {
        reduce((self.second)(key), capacity)
    }
}

#[inline]
fn reduce(h: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (h % capacity as u64) as usize
}

/// Bernstein's djb2: `h = h * 33 + byte`, seeded with 5381.
pub fn djb2(key: &[u8]) -> u64 {
    key.iter().fold(5381u64, |h, &b| {
        (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
    })
}

/// Polynomial rolling hash with multiplier 37, seeded with 7.
pub fn poly37(key: &[u8]) -> u64 {
    key.iter()
        .fold(7u64, |h, &b| h.wrapping_mul(37).wrapping_add(u64::from(b)))
}

/// Integer avalanche over a native-endian `u32`. Keys of any other length
/// fall back to djb2.
pub fn avalanche_u32(key: &[u8]) -> u64 {
    let Ok(bytes) = <[u8; 4]>::try_from(key) else {
        return djb2(key);
    };
    let mut h = u32::from_ne_bytes(bytes);
    h = ((h >> 16) ^ h).wrapping_mul(0x45d9f3b);
    h = ((h >> 16) ^ h).wrapping_mul(0x45d9f3b);
    h = (h >> 16) ^ h;
    u64::from(h)
}

fn xxh64(seed: u64, key: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(seed);
    hasher.write(key);
    hasher.finish()
}

/// xxHash64 with a fixed seed; the primary hash for fixed-width keys.
pub fn xxh64_primary(key: &[u8]) -> u64 {
    xxh64(PRIMARY_SEED, key)
}

/// xxHash64 with a second fixed seed; the secondary hash for fixed-width keys.
pub fn xxh64_secondary(key: &[u8]) -> u64 {
    xxh64(SECONDARY_SEED, key)
}
