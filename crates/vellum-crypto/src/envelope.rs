//! Versioned authenticated-encryption envelope.
//!
//! The header (version, salt, nonce) is bound to the ciphertext as
//! associated data, so any modified byte after the version fails
//! authentication.

use std::sync::Arc;

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use tracing::debug;

use crate::error::{CryptoError, CryptoResult, InvalidInput};
use crate::kdf::{KeyDerivation, SALT_LEN};
use crate::provider::{CryptoProvider, SystemCrypto};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// AEAD nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Bytes before the ciphertext: version, salt, nonce.
pub const HEADER_LEN: usize = 1 + SALT_LEN + NONCE_LEN;

/// Smallest well-formed envelope (empty plaintext).
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + TAG_LEN;

/// Leading bytes of unencrypted payloads the envelope can be confused with:
/// a raw store export and a zstd frame.
pub const KNOWN_PLAINTEXT_SIGNATURES: &[&[u8]] = &[b"VLMSTORE", &[0x28, 0xb5, 0x2f, 0xfd]];

/// Parsed view of an envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub version: u8,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Split raw bytes into header fields and ciphertext.
    ///
    /// Length is checked before any slicing; the version is checked before
    /// the tag-inclusive minimum so an unknown format is reported as such.
    pub fn parse(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(InvalidInput::EnvelopeTooShort {
                len: bytes.len(),
                min: HEADER_LEN,
            }
            .into());
        }
        let version = bytes[0];
        if version != ENVELOPE_VERSION {
            return Err(InvalidInput::UnsupportedVersion {
                found: version,
                expected: ENVELOPE_VERSION,
            }
            .into());
        }
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(InvalidInput::EnvelopeTooShort {
                len: bytes.len(),
                min: MIN_ENVELOPE_LEN,
            }
            .into());
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[1..1 + SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[1 + SALT_LEN..HEADER_LEN]);

        Ok(Self {
            version,
            salt,
            nonce,
            ciphertext: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// The header bytes, also used as associated data.
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0] = self.version;
        header[1..1 + SALT_LEN].copy_from_slice(&self.salt);
        header[1 + SALT_LEN..].copy_from_slice(&self.nonce);
        header
    }

    /// Serialize back to the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.header());
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Encodes and decodes envelopes with a password.
///
/// The codec never stores the password; each call borrows it. Key
/// derivation uses the iteration count pinned to [`ENVELOPE_VERSION`].
#[derive(Clone)]
pub struct EnvelopeCodec {
    kdf: KeyDerivation,
    provider: Arc<dyn CryptoProvider>,
}

impl EnvelopeCodec {
    /// Codec using the operating-system RNG.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(SystemCrypto))
    }

    /// Codec drawing salts and nonces from `provider`.
    pub fn with_provider(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            kdf: KeyDerivation::default(),
            provider,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_parts(kdf: KeyDerivation, provider: Arc<dyn CryptoProvider>) -> Self {
        Self { kdf, provider }
    }

    /// Encrypt `plaintext` under `password` with fresh salt and nonce.
    pub fn encode(&self, plaintext: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
        if password.is_empty() {
            return Err(InvalidInput::EmptyPassword.into());
        }

        let mut salt = [0u8; SALT_LEN];
        self.provider.fill_random(&mut salt)?;
        let mut nonce = [0u8; NONCE_LEN];
        self.provider.fill_random(&mut nonce)?;

        let key = self.kdf.derive(password, &salt)?;
        let mut envelope = EncryptedEnvelope {
            version: ENVELOPE_VERSION,
            salt,
            nonce,
            ciphertext: Vec::new(),
        };
        let header = envelope.header();

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        envelope.ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &header,
                },
            )
            .map_err(|_| CryptoError::EncryptionFailed)?;

        debug!(
            plaintext_len = plaintext.len(),
            envelope_len = HEADER_LEN + envelope.ciphertext.len(),
            provider = self.provider.name(),
            "encoded envelope"
        );
        Ok(envelope.to_bytes())
    }

    /// Decrypt an envelope produced by [`Self::encode`].
    pub fn decode(&self, bytes: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
        if password.is_empty() {
            return Err(InvalidInput::EmptyPassword.into());
        }
        let envelope = EncryptedEnvelope::parse(bytes)?;
        let key = self.kdf.derive(password, &envelope.salt)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        let header = envelope.header();
        cipher
            .decrypt(
                Nonce::from_slice(&envelope.nonce),
                Payload {
                    msg: &envelope.ciphertext,
                    aad: &header,
                },
            )
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Best-effort guess whether `bytes` is an envelope.
    ///
    /// Checks the version byte, the minimum length, and that the bytes do
    /// not start with a known plaintext signature. Random or foreign data
    /// can still pass; only a successful [`Self::decode`] is authoritative.
    pub fn is_likely_encrypted(bytes: &[u8]) -> bool {
        if bytes.len() < MIN_ENVELOPE_LEN || bytes[0] != ENVELOPE_VERSION {
            return false;
        }
        !KNOWN_PLAINTEXT_SIGNATURES
            .iter()
            .any(|signature| bytes.starts_with(signature))
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("kdf", &self.kdf)
            .field("provider", &self.provider.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fast_codec() -> EnvelopeCodec {
        EnvelopeCodec::with_parts(KeyDerivation::with_iterations(1_000), Arc::new(SystemCrypto))
    }

    struct NoRandom;

    impl CryptoProvider for NoRandom {
        fn fill_random(&self, _buf: &mut [u8]) -> CryptoResult<()> {
            Err(CryptoError::PlatformUnsupported("no entropy source".into()))
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    #[test]
    fn correct_and_wrong_password() {
        let codec = EnvelopeCodec::new();
        let envelope = codec.encode(&[1, 2, 3, 4, 5], "correct").unwrap();
        assert_eq!(codec.decode(&envelope, "correct").unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            codec.decode(&envelope, "wrong").unwrap_err(),
            CryptoError::DecryptionFailed
        );
    }

    #[test]
    fn layout_matches_wire_format() {
        let codec = fast_codec();
        let envelope = codec.encode(b"abc", "pw").unwrap();
        assert_eq!(envelope[0], ENVELOPE_VERSION);
        assert_eq!(envelope.len(), HEADER_LEN + 3 + TAG_LEN);

        let parsed = EncryptedEnvelope::parse(&envelope).unwrap();
        assert_eq!(&parsed.salt[..], &envelope[1..17]);
        assert_eq!(&parsed.nonce[..], &envelope[17..29]);
        assert_eq!(parsed.to_bytes(), envelope);
    }

    #[test]
    fn salt_and_nonce_are_fresh() {
        let codec = fast_codec();
        let a = EncryptedEnvelope::parse(&codec.encode(b"same", "pw").unwrap()).unwrap();
        let b = EncryptedEnvelope::parse(&codec.encode(b"same", "pw").unwrap()).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let codec = fast_codec();
        let envelope = codec.encode(b"", "pw").unwrap();
        assert_eq!(envelope.len(), MIN_ENVELOPE_LEN);
        assert!(codec.decode(&envelope, "pw").unwrap().is_empty());
    }

    #[test]
    fn every_bit_flip_after_version_fails_authentication() {
        let codec = fast_codec();
        let envelope = codec.encode(b"tamper me", "pw").unwrap();
        for byte in 1..envelope.len() {
            for bit in 0..8 {
                let mut corrupted = envelope.clone();
                corrupted[byte] ^= 1 << bit;
                assert_eq!(
                    codec.decode(&corrupted, "pw").unwrap_err(),
                    CryptoError::DecryptionFailed,
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn version_byte_flip_is_unsupported_version() {
        let codec = fast_codec();
        let mut envelope = codec.encode(b"x", "pw").unwrap();
        envelope[0] ^= 0x02;
        assert_eq!(
            codec.decode(&envelope, "pw").unwrap_err(),
            CryptoError::InvalidInput(InvalidInput::UnsupportedVersion {
                found: 3,
                expected: 1
            })
        );
    }

    #[test]
    fn short_envelope_rejected_before_slicing() {
        let codec = fast_codec();
        assert_eq!(
            codec.decode(&[1u8; 10], "pw").unwrap_err(),
            CryptoError::InvalidInput(InvalidInput::EnvelopeTooShort { len: 10, min: 29 })
        );
        assert_eq!(
            codec.decode(&[1u8; 40], "pw").unwrap_err(),
            CryptoError::InvalidInput(InvalidInput::EnvelopeTooShort { len: 40, min: 45 })
        );
    }

    #[test]
    fn empty_password_rejected() {
        let codec = fast_codec();
        assert_eq!(
            codec.encode(b"x", "").unwrap_err(),
            CryptoError::InvalidInput(InvalidInput::EmptyPassword)
        );
    }

    #[test]
    fn missing_randomness_is_platform_unsupported() {
        let codec = EnvelopeCodec::with_parts(KeyDerivation::with_iterations(1_000), Arc::new(NoRandom));
        assert!(matches!(
            codec.encode(b"x", "pw"),
            Err(CryptoError::PlatformUnsupported(_))
        ));
    }

    #[test]
    fn likely_encrypted_heuristic() {
        let codec = fast_codec();
        let envelope = codec.encode(b"payload", "pw").unwrap();
        assert!(EnvelopeCodec::is_likely_encrypted(&envelope));

        assert!(!EnvelopeCodec::is_likely_encrypted(b"VLMSTORE\x01rest-of-an-export-padding-padding-padding"));
        assert!(!EnvelopeCodec::is_likely_encrypted(&[1u8; 20]));

        let mut zstd_like = vec![0x28, 0xb5, 0x2f, 0xfd];
        zstd_like.resize(64, 0);
        assert!(!EnvelopeCodec::is_likely_encrypted(&zstd_like));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..512), password in "[ -~]{1,24}") {
            let codec = fast_codec();
            let envelope = codec.encode(&plaintext, &password).unwrap();
            prop_assert_eq!(codec.decode(&envelope, &password).unwrap(), plaintext);
        }

        #[test]
        fn different_password_fails(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
            prop_assume!(a != b);
            let codec = fast_codec();
            let envelope = codec.encode(b"secret", &a).unwrap();
            prop_assert_eq!(codec.decode(&envelope, &b).unwrap_err(), CryptoError::DecryptionFailed);
        }
    }
}
