use vellum_types::CommitHash;

/// Errors produced by commit chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A record references a parent that is not in the store.
    #[error("broken chain: {child} references missing parent {missing_parent}")]
    BrokenChain {
        child: CommitHash,
        missing_parent: CommitHash,
    },

    #[error("commit not found: {0}")]
    NotFound(CommitHash),

    #[error("cycle detected at commit {0}")]
    Cycle(CommitHash),

    #[error("commit {child} is not newer than its parent {parent}")]
    OutOfOrder { child: CommitHash, parent: CommitHash },

    #[error("parent {parent} is not the chain head {head}")]
    NotHead { parent: CommitHash, head: CommitHash },

    #[error("parent {0} is pending; only confirmed commits can be extended")]
    PendingParent(CommitHash),

    #[error("commit {0} is confirmed and cannot be reverted")]
    CannotRevertConfirmed(CommitHash),

    #[error("chain has no root commit")]
    NoRoot,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(#[from] vellum_store::StoreError),
}

/// Result alias for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
