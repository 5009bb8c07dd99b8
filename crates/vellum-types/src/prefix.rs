use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::TypeError;

/// Truncated lowercase-hex digest carried in addressed file names.
///
/// Always between [`DigestPrefix::MIN_LEN`] and [`DigestPrefix::MAX_LEN`]
/// characters of `[a-f0-9]`. Comparison is exact; parsing normalizes case.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DigestPrefix(String);

impl DigestPrefix {
    pub const MIN_LEN: usize = 6;
    pub const MAX_LEN: usize = 64;
    pub const DEFAULT_LEN: usize = 8;

    /// Parse a prefix, accepting upper- or lowercase hex.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Self::check_len(s.len())?;
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidHex(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Take the first `len` hex characters of a full digest.
    pub fn from_digest(digest: &ContentDigest, len: usize) -> Result<Self, TypeError> {
        Self::check_len(len)?;
        let mut hex = digest.to_hex();
        hex.truncate(len);
        Ok(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a prefix has at least [`Self::MIN_LEN`] characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `digest` starts with this prefix.
    pub fn matches(&self, digest: &ContentDigest) -> bool {
        digest.to_hex().starts_with(&self.0)
    }

    fn check_len(len: usize) -> Result<(), TypeError> {
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(TypeError::PrefixLength {
                len,
                min: Self::MIN_LEN,
                max: Self::MAX_LEN,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for DigestPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestPrefix({})", self.0)
    }
}

impl fmt::Display for DigestPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DigestPrefix {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DigestPrefix> for String {
    fn from(prefix: DigestPrefix) -> Self {
        prefix.0
    }
}
