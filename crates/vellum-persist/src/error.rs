use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    /// Encryption is required or the payload is encrypted, but the session
    /// has no password.
    #[error("a password is required for this document")]
    PasswordRequired,

    #[error("a save is already in progress (state: {0})")]
    SaveInProgress(String),

    #[error("document has no payload region")]
    MissingPayloadRegion,

    #[error("document payload is not valid base64: {0}")]
    PayloadEncoding(String),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] vellum_crypto::CryptoError),

    #[error("store error: {0}")]
    Store(#[from] vellum_store::StoreError),

    #[error("chain error: {0}")]
    Chain(#[from] vellum_chain::ChainError),

    #[error("verification error: {0}")]
    Verify(#[from] vellum_verify::VerifyError),

    /// A blocking crypto task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

pub type PersistResult<T> = Result<T, PersistError>;
