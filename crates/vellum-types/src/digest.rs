use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::prefix::DigestPrefix;

/// Full digest of a document's canonical content.
///
/// A `ContentDigest` is a BLAKE3 hash. Identical canonical content always
/// produces the same digest; the human-facing [`DigestPrefix`] is a
/// truncation of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Create a digest from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Truncate to a prefix of `len` hex characters.
    pub fn prefix(&self, len: usize) -> Result<DigestPrefix, TypeError> {
        DigestPrefix::from_digest(self, len)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for ContentDigest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
