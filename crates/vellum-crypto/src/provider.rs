use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Host cryptographic capabilities that can be absent at runtime.
///
/// Key derivation, the AEAD and hashing are compiled in, so the only
/// primitive a host can fail to provide is secure randomness. A provider
/// that cannot fill the buffer must return
/// [`CryptoError::PlatformUnsupported`]; callers never fall back to a
/// weaker source.
pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes.
    fn fill_random(&self, buf: &mut [u8]) -> CryptoResult<()>;

    /// Short provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Operating-system RNG provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCrypto;

impl CryptoProvider for SystemCrypto {
    fn fill_random(&self, buf: &mut [u8]) -> CryptoResult<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CryptoError::PlatformUnsupported(format!("secure random source: {e}")))
    }

    fn name(&self) -> &'static str {
        "system"
    }
}
