//! Construction-time settings for a `Table`.

use crate::double_hash::PROBE_STEP_PRIME;
use crate::error::TableError;
use crate::key_codec::KeyKind;
use crate::prime::is_prime;

/// Capacity of a freshly created table.
pub const DEFAULT_INITIAL_CAPACITY: usize = 17;
/// Each growth picks the smallest prime at or above `capacity * 4`.
pub const DEFAULT_GROWTH_FACTOR: usize = 4;
/// Consecutive growths one insert may trigger before giving up.
pub const DEFAULT_MAX_RESIZE_ATTEMPTS: u32 = 8;

/// Collision resolution algorithm, fixed for the life of a table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CollisionStrategy {
    /// Two slot arrays; bounded eviction chains, growth on overflow.
    #[default]
    Cuckoo,
    /// One slot array probed with a step from the secondary hash; growth at
    /// two-thirds occupancy.
    DoubleHashing,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    pub key_kind: KeyKind,
    pub strategy: CollisionStrategy,
    /// Must be prime and larger than the double-hashing step prime.
    pub initial_capacity: usize,
    pub growth_factor: usize,
    pub max_resize_attempts: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            key_kind: KeyKind::Text,
            strategy: CollisionStrategy::Cuckoo,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_resize_attempts: DEFAULT_MAX_RESIZE_ATTEMPTS,
        }
    }
}

impl TableConfig {
    pub fn new(key_kind: KeyKind) -> Self {
        Self {
            key_kind,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn with_max_resize_attempts(mut self, attempts: u32) -> Self {
        self.max_resize_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<(), TableError> {
        let reject = |reason: String| Err(TableError::InvalidConfig { reason });
        if !is_prime(self.initial_capacity) {
            return reject(format!(
                "initial capacity {} is not prime",
                self.initial_capacity
            ));
        }
        if self.initial_capacity <= PROBE_STEP_PRIME {
            return reject(format!(
                "initial capacity {} must exceed {}",
                self.initial_capacity, PROBE_STEP_PRIME
            ));
        }
        if self.growth_factor < 2 {
            return reject(format!(
                "growth factor {} must be at least 2",
                self.growth_factor
            ));
        }
        if self.max_resize_attempts == 0 {
            return reject("at least one resize attempt is required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = TableConfig::default();
        assert_eq!(c.initial_capacity, 17);
        assert_eq!(c.growth_factor, 4);
        assert_eq!(c.strategy, CollisionStrategy::Cuckoo);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let c = TableConfig::new(KeyKind::from_width(8))
            .with_strategy(CollisionStrategy::DoubleHashing)
            .with_initial_capacity(31)
            .with_growth_factor(2)
            .with_max_resize_attempts(3);
        assert_eq!(c.key_kind.width(), 8);
        assert_eq!(c.strategy, CollisionStrategy::DoubleHashing);
        assert_eq!(c.initial_capacity, 31);
        assert_eq!(c.growth_factor, 2);
        assert_eq!(c.max_resize_attempts, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        for c in [
            TableConfig::default().with_initial_capacity(16),
            TableConfig::default().with_initial_capacity(13),
            TableConfig::default().with_growth_factor(1),
            TableConfig::default().with_max_resize_attempts(0),
        ] {
            match c.validate() {
                Err(TableError::InvalidConfig { .. }) => {}
                other => panic!("{:?} accepted: {:?}", c, other),
            }
        }
    }
}
