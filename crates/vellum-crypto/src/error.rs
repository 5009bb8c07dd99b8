use thiserror::Error;

/// Errors from key derivation and envelope operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The host cannot supply a required primitive (usually secure randomness).
    #[error("platform unsupported: {0}")]
    PlatformUnsupported(String),

    /// Caller-supplied input was rejected before any cryptographic work.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Authentication failed. Wrong password and tampered ciphertext are
    /// reported identically.
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// The AEAD refused to encrypt (plaintext exceeds the cipher's limit).
    #[error("encryption failed")]
    EncryptionFailed,
}

/// Reasons an input is rejected up front.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("password must not be empty")]
    EmptyPassword,

    #[error("salt must be {expected} bytes, got {actual}")]
    SaltLength { expected: usize, actual: usize },

    #[error("envelope is {len} bytes, minimum is {min}")]
    EnvelopeTooShort { len: usize, min: usize },

    #[error("unsupported envelope version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },
}

/// Result alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
