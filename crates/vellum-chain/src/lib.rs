//! Append-only commit chain for Vellum documents.
//!
//! This crate records every saved version of a document as a
//! [`CommitRecord`] in the `commits` table of the document's own data
//! store. It provides:
//! - Idempotent root creation
//! - Hash-linked appends, including a two-phase tentative/confirm/revert path
//! - A lazy [`ChainWalk`] from any commit back to the root
//! - Whole-chain validation producing a [`ChainReport`]
//!
//! # Invariants
//!
//! - Exactly one record has no parent (the root).
//! - Every other record's parent exists and has a lower sequence number.
//! - Hashes are unique; re-inserting an existing hash is a no-op.

pub mod error;
pub mod record;
pub mod store;
pub mod validation;
pub mod walk;

pub use error::{ChainError, ChainResult};
pub use record::{compute_commit_hash, CommitRecord, CommitState, PARTIAL_SNAPSHOT_LEN, ROOT_MESSAGE};
pub use store::{CommitChainStore, COMMITS_TABLE};
pub use validation::{BrokenLink, ChainReport};
pub use walk::ChainWalk;
