//! Cryptographic primitives for Vellum.
//!
//! Provides PBKDF2-HMAC-SHA256 password key derivation, the versioned
//! ChaCha20-Poly1305 envelope that carries a document's data store, and
//! domain-separated BLAKE3 hashing for content addresses and commit hashes.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.
//!
//! # Envelope wire format
//!
//! ```text
//! byte 0       format version (1)
//! bytes 1..17  PBKDF2 salt (16 bytes, fresh per encode)
//! bytes 17..29 AEAD nonce (12 bytes, fresh per encode)
//! bytes 29..   ciphertext || 16-byte Poly1305 tag
//! ```

pub mod envelope;
pub mod error;
pub mod hasher;
pub mod kdf;
pub mod provider;

pub use envelope::{EncryptedEnvelope, EnvelopeCodec};
pub use error::{CryptoError, CryptoResult, InvalidInput};
pub use hasher::ContentHasher;
pub use kdf::{DerivedKey, KeyDerivation, Password};
pub use provider::{CryptoProvider, SystemCrypto};
