//! Error type shared by every fallible table operation.

use thiserror::Error;

/// Failure reported by table construction and insertion.
///
/// A missing key is not an error: lookups and removals report it through
/// `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A construction parameter was out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: &'static str,
    },

    /// A bucket array could not be allocated.
    #[error("allocation failed: could not allocate {buckets} buckets")]
    AllocationFailure {
        /// Number of buckets requested
        buckets: usize,
    },
}

impl TableError {
    pub(crate) fn invalid(reason: &'static str) -> Self {
        TableError::InvalidArgument { reason }
    }

    pub(crate) fn alloc(buckets: usize) -> Self {
        TableError::AllocationFailure { buckets }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_cause() {
        let e = TableError::invalid("initial capacity must be positive");
        assert_eq!(
            e.to_string(),
            "invalid argument: initial capacity must be positive"
        );
        let e = TableError::alloc(64);
        assert_eq!(e.to_string(), "allocation failed: could not allocate 64 buckets");
    }
}
