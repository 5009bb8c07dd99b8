use serde::Serialize;
use tracing::{debug, warn};

use vellum_crypto::ContentHasher;
use vellum_types::{ContentDigest, DigestPrefix};

use crate::canonical::canonicalize;
use crate::error::VerifyResult;
use crate::name::{AddressedName, DEFAULT_EXTENSION};

/// Outcome class of a verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VerificationStatus {
    /// The name's prefix matches the recomputed digest.
    Verified,
    /// No prefix in the name, or the digest could not be recomputed.
    Unverified,
    /// The name's prefix differs from the recomputed digest.
    Tampered,
}

/// Result of checking a document against its name.
///
/// Lives only for the current open session; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    /// Prefix carried by the name.
    pub expected_prefix: Option<DigestPrefix>,
    /// Prefix of the recomputed digest, truncated to the expected length.
    pub actual_prefix: Option<DigestPrefix>,
    pub full_digest: Option<ContentDigest>,
    pub subject_name: String,
    /// Why the result is unverified.
    pub reason: Option<String>,
}

impl VerificationResult {
    pub fn unverified(subject_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: VerificationStatus::Unverified,
            expected_prefix: None,
            actual_prefix: None,
            full_digest: None,
            subject_name: subject_name.into(),
            reason: Some(reason.into()),
        }
    }

    /// Compare an expected prefix with a recomputed digest.
    pub fn classify(
        subject_name: impl Into<String>,
        expected: DigestPrefix,
        digest: ContentDigest,
    ) -> Self {
        let subject_name = subject_name.into();
        match digest.prefix(expected.len()) {
            Ok(actual) => {
                let status = if actual == expected {
                    VerificationStatus::Verified
                } else {
                    VerificationStatus::Tampered
                };
                Self {
                    status,
                    expected_prefix: Some(expected),
                    actual_prefix: Some(actual),
                    full_digest: Some(digest),
                    subject_name,
                    reason: None,
                }
            }
            Err(e) => Self {
                expected_prefix: Some(expected),
                full_digest: Some(digest),
                ..Self::unverified(subject_name, e.to_string())
            },
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }

    pub fn is_tampered(&self) -> bool {
        self.status == VerificationStatus::Tampered
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self.status {
            VerificationStatus::Verified => format!(
                "{}: verified ({})",
                self.subject_name,
                self.actual_prefix.as_ref().map(DigestPrefix::as_str).unwrap_or("")
            ),
            VerificationStatus::Tampered => format!(
                "{}: TAMPERED (expected {}, actual {})",
                self.subject_name,
                self.expected_prefix.as_ref().map(DigestPrefix::as_str).unwrap_or("?"),
                self.actual_prefix.as_ref().map(DigestPrefix::as_str).unwrap_or("?"),
            ),
            VerificationStatus::Unverified => format!(
                "{}: unverified ({})",
                self.subject_name,
                self.reason.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Computes content addresses and classifies documents against their names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentAddressVerifier {
    prefix_len: usize,
}

impl ContentAddressVerifier {
    /// Verifier producing prefixes of `prefix_len` hex characters.
    pub fn new(prefix_len: usize) -> VerifyResult<Self> {
        // Validate once here so name generation cannot fail on length later.
        DigestPrefix::from_digest(&ContentDigest::from_hash([0; 32]), prefix_len)?;
        Ok(Self { prefix_len })
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Digest of the canonical form of `content`.
    pub fn digest(&self, content: &str) -> VerifyResult<ContentDigest> {
        let canonical = canonicalize(content)?;
        let digest = ContentHasher::DOCUMENT.digest(canonical.as_bytes());
        debug!(
            content_len = content.len(),
            canonical_len = canonical.len(),
            digest = %digest,
            "computed content digest"
        );
        Ok(digest)
    }

    /// Check `content` against the prefix carried by `name`.
    ///
    /// Never fails: every problem is reported as `Unverified` with a reason.
    pub fn verify(&self, name: &str, content: &str) -> VerificationResult {
        let expected = match AddressedName::parse(name) {
            Ok(AddressedName {
                prefix: Some(prefix),
                ..
            }) => prefix,
            Ok(_) => return VerificationResult::unverified(name, "no address in name"),
            Err(e) => return VerificationResult::unverified(name, e.to_string()),
        };

        let digest = match self.digest(content) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(subject = name, error = %e, "could not recompute content address");
                return VerificationResult {
                    expected_prefix: Some(expected),
                    ..VerificationResult::unverified(name, e.to_string())
                };
            }
        };

        let result = VerificationResult::classify(name, expected, digest);
        if result.is_tampered() {
            warn!(summary = %result.summary(), "content address mismatch");
        }
        result
    }

    /// Deterministic addressed name for `content`.
    ///
    /// Any existing address in `name` is replaced. A name without an
    /// extension gets [`DEFAULT_EXTENSION`].
    pub fn generate_addressed_name(&self, name: &str, content: &str) -> VerifyResult<String> {
        let mut parsed = AddressedName::parse(name)?;
        if parsed.extension.is_empty() {
            parsed.extension = DEFAULT_EXTENSION.to_string();
        }
        let prefix = self.digest(content)?.prefix(self.prefix_len)?;
        Ok(parsed.with_prefix(prefix).to_string())
    }
}

impl Default for ContentAddressVerifier {
    fn default() -> Self {
        Self {
            prefix_len: DigestPrefix::DEFAULT_LEN,
        }
    }
}
