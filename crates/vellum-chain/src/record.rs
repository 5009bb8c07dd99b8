use serde::{Deserialize, Serialize};

use vellum_crypto::ContentHasher;
use vellum_types::CommitHash;

use crate::error::{ChainError, ChainResult};

/// How many leading snapshot bytes feed a commit hash.
///
/// Commit hashes bind only this slice of the exported store, not the whole
/// document; the document's own content address covers the rest.
pub const PARTIAL_SNAPSHOT_LEN: usize = 64 * 1024;

/// Message of the root commit.
pub const ROOT_MESSAGE: &str = "Initial version";

/// Whether a commit's document write has been confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitState {
    /// Appended before the write finished; may still be reverted.
    Pending,
    /// The document version it describes was written.
    Confirmed,
}

/// One version in the chain. Immutable once confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: CommitHash,
    pub parent_hash: Option<CommitHash>,
    pub message: String,
    pub created_at_ms: u64,
    /// Insertion order; strictly greater than the parent's.
    pub seq: u64,
    pub state: CommitState,
}

impl CommitRecord {
    pub fn is_root(&self) -> bool {
        self.parent_hash.is_none()
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == CommitState::Confirmed
    }

    pub(crate) fn to_row(&self) -> ChainResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ChainError::Serialization(e.to_string()))
    }

    pub(crate) fn from_row(bytes: &[u8]) -> ChainResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ChainError::Serialization(e.to_string()))
    }
}

/// Hash of a new commit.
///
/// Covers the first [`PARTIAL_SNAPSHOT_LEN`] bytes of `snapshot`, the
/// creation time, the message and the parent. Variable-length fields are
/// length-prefixed.
pub fn compute_commit_hash(
    snapshot: &[u8],
    created_at_ms: u64,
    message: &str,
    parent: Option<&CommitHash>,
) -> CommitHash {
    let partial = &snapshot[..snapshot.len().min(PARTIAL_SNAPSHOT_LEN)];
    let mut hasher = ContentHasher::COMMIT.start();
    hasher.update(&(partial.len() as u64).to_le_bytes());
    hasher.update(partial);
    hasher.update(&created_at_ms.to_le_bytes());
    hasher.update(&(message.len() as u64).to_le_bytes());
    hasher.update(message.as_bytes());
    match parent {
        Some(parent) => {
            hasher.update(&[1]);
            hasher.update(parent.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
    CommitHash::from_hash(*hasher.finalize().as_bytes())
}
