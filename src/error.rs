//! Error taxonomy for table construction and mutation.

/// Errors surfaced by [`Table`](crate::Table) operations.
///
/// Cuckoo displacement overflow is not listed here: it is handled inside
/// the table by growing and never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A key could not be interpreted under the table's key kind.
    #[error("invalid key: {reason}")]
    InvalidArgument { reason: String },

    /// A double-hashing probe visited every slot without finding an empty one.
    #[error("probe sequence exhausted all {capacity} slots")]
    ProbeExhausted { capacity: usize },

    /// Growing the table could not place every entry.
    #[error("rehash failed after {attempts} growth attempts (last capacity {capacity})")]
    RehashFailure { capacity: usize, attempts: u32 },

    /// The next table size does not fit in `usize`.
    #[error("capacity {capacity} cannot grow by a factor of {growth_factor}")]
    CapacityOverflow { capacity: usize, growth_factor: usize },

    /// A `TableConfig` was rejected before any storage was allocated.
    #[error("invalid table configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl TableError {
    /// True for errors that indicate a broken hash or sizing design rather
    /// than bad input from the caller.
    pub fn is_design_fault(&self) -> bool {
        matches!(
            self,
            Self::ProbeExhausted { .. } | Self::RehashFailure { .. }
        )
    }
}
