use tracing::debug;

use crate::config::Compression;
use crate::error::{PersistError, PersistResult};

/// zstd frame magic.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(&ZSTD_MAGIC)
}

pub fn compress(data: &[u8], mode: Compression) -> PersistResult<Vec<u8>> {
    match mode {
        Compression::Off => Ok(data.to_vec()),
        Compression::Zstd { level } => {
            let out = zstd::encode_all(data, level)
                .map_err(|e| PersistError::Compression(e.to_string()))?;
            debug!(raw = data.len(), compressed = out.len(), level, "payload compressed");
            Ok(out)
        }
    }
}

/// Decompress when `data` is a zstd frame, otherwise pass it through.
pub fn decompress_if_framed(data: Vec<u8>) -> PersistResult<Vec<u8>> {
    if !is_compressed(&data) {
        return Ok(data);
    }
    zstd::decode_all(data.as_slice()).map_err(|e| PersistError::Compression(e.to_string()))
}
