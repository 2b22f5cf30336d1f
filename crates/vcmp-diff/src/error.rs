//! Error types for the diff crate.

use vcmp_types::{TypeError, ValueKind};

/// Errors that can occur during comparison operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A caller passed a value of the wrong kind.
    #[error("invalid argument `{argument}`: expected {expected}, got {actual}")]
    InvalidArgument {
        argument: &'static str,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Building or parsing an input value failed.
    #[error("value error: {0}")]
    Type(#[from] TypeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
