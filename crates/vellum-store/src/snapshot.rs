//! Byte format of a store export.
//!
//! ```text
//! bytes 0..8  magic "VLMSTORE"
//! byte  8     format version
//! bytes 9..   bincode-encoded table map
//! ```

use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};

/// Signature at the start of every export.
pub const STORE_MAGIC: &[u8; 8] = b"VLMSTORE";

/// Current export format version.
pub const STORE_FORMAT_VERSION: u8 = 1;

pub(crate) type Tables = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

pub(crate) fn encode(tables: &Tables) -> StoreResult<Vec<u8>> {
    let body = bincode::serialize(tables).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(STORE_MAGIC.len() + 1 + body.len());
    out.extend_from_slice(STORE_MAGIC);
    out.push(STORE_FORMAT_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8]) -> StoreResult<Tables> {
    let header_len = STORE_MAGIC.len() + 1;
    if bytes.len() < header_len || &bytes[..STORE_MAGIC.len()] != STORE_MAGIC {
        return Err(StoreError::InvalidMagic);
    }
    let version = bytes[STORE_MAGIC.len()];
    if version != STORE_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }
    bincode::deserialize(&bytes[header_len..]).map_err(|e| StoreError::Serialization(e.to_string()))
}
