//! Password-based key derivation.
//!
//! PBKDF2-HMAC-SHA256 producing a 256-bit key for the envelope cipher. The
//! iteration count is fixed by the envelope version and is not configurable,
//! so any build can open any document of a known version. A [`DerivedKey`] is bound to the salt it was
//! derived from and is wiped from memory on drop.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::envelope::ENVELOPE_VERSION;
use crate::error::{CryptoResult, InvalidInput};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Iteration count for envelope version 1. Part of the wire format.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// A document password held for the lifetime of one session.
///
/// Never empty. The backing string is zeroized on drop and `Debug` output
/// is redacted.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(password: impl Into<String>) -> CryptoResult<Self> {
        let password = Zeroizing::new(password.into());
        if password.is_empty() {
            return Err(InvalidInput::EmptyPassword.into());
        }
        Ok(Self(password))
    }

    /// Borrow the secret for a single cryptographic call.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }
}

impl Eq for Password {}

/// 256-bit symmetric key derived from a password and salt.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// PBKDF2-HMAC-SHA256 key derivation with the iteration count of an
/// envelope version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyDerivation {
    iterations: u32,
}

impl KeyDerivation {
    /// Derivation used by envelopes of `version`.
    pub fn for_version(version: u8) -> CryptoResult<Self> {
        match version {
            ENVELOPE_VERSION => Ok(Self {
                iterations: DEFAULT_ITERATIONS,
            }),
            found => Err(InvalidInput::UnsupportedVersion {
                found,
                expected: ENVELOPE_VERSION,
            }
            .into()),
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive a key from `password` and a 16-byte `salt`.
    pub fn derive(&self, password: &str, salt: &[u8]) -> CryptoResult<DerivedKey> {
        if password.is_empty() {
            return Err(InvalidInput::EmptyPassword.into());
        }
        if salt.len() != SALT_LEN {
            return Err(InvalidInput::SaltLength {
                expected: SALT_LEN,
                actual: salt.len(),
            }
            .into());
        }
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key);
        let derived = DerivedKey(key);
        key.zeroize();
        Ok(derived)
    }
}

impl Default for KeyDerivation {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}
