use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("digest prefix length {len} outside {min}..={max}")]
    PrefixLength { len: usize, min: usize, max: usize },
}
