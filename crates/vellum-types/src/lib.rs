//! Foundation types for Vellum.
//!
//! Every other Vellum crate depends on `vellum-types`. The types here are
//! small, copyable identifiers with no behaviour beyond parsing and
//! formatting.
//!
//! # Key Types
//!
//! - [`ContentDigest`]: full 32-byte BLAKE3 digest of canonical document content
//! - [`DigestPrefix`]: truncated lowercase-hex digest used in addressed file names
//! - [`CommitHash`]: primary key of a commit record in the version chain

pub mod commit;
pub mod digest;
pub mod error;
pub mod prefix;
pub mod temporal;

pub use commit::CommitHash;
pub use digest::ContentDigest;
pub use error::TypeError;
pub use prefix::DigestPrefix;
pub use temporal::unix_millis;
