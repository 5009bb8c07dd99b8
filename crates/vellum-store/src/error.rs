/// Errors from data store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The snapshot does not start with the store signature.
    #[error("not a store snapshot: bad magic")]
    InvalidMagic,

    /// The snapshot was written by an unknown format revision.
    #[error("unsupported store format version: {0}")]
    UnsupportedVersion(u8),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Table names must be non-empty.
    #[error("invalid table name: {0:?}")]
    InvalidTable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
