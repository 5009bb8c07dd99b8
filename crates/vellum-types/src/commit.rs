use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Primary key of a commit record.
///
/// Serialized as a 64-character lowercase hex string so that exported
/// stores stay readable by other tooling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitHash([u8; 32]);

impl CommitHash {
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitHash({})", self.short_hex())
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for CommitHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<CommitHash> for String {
    fn from(hash: CommitHash) -> Self {
        hash.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_hex() {
        let hash = CommitHash::from_hash([0x11; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "11".repeat(32)));
        let back: CommitHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(CommitHash::from_hash([0xfe; 32]).short_hex(), "fefefefe");
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert_eq!(
            CommitHash::from_hex("00ff").unwrap_err(),
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }
}
