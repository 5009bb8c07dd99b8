//! Content addressing and tamper detection for Vellum documents.
//!
//! A saved document's file name carries a truncated digest of the document
//! itself: `<basename>.<hexPrefix>.<extension>`. On open, the digest is
//! recomputed and compared with the name.
//!
//! The document renders its verification badge into itself, so the digest
//! is computed over a canonical form with the badge region removed (see
//! [`canonical`]). Without that exclusion every badge update would look
//! like tampering.

pub mod canonical;
pub mod error;
pub mod name;
pub mod verifier;

pub use canonical::{canonicalize, BADGE_BEGIN, BADGE_END};
pub use error::{VerifyError, VerifyResult};
pub use name::{extract_prefix, strip_address, AddressedName, DEFAULT_EXTENSION};
pub use verifier::{ContentAddressVerifier, VerificationResult, VerificationStatus};
