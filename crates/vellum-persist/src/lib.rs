//! Save and open orchestration for Vellum documents.
//!
//! A document is a single HTML file carrying its own data store. Saving
//! exports the store, optionally compresses and encrypts it, embeds it in
//! the file, names the file by its content address, records a commit and
//! hands the bytes to a [`SaveStrategy`]. Opening reverses the payload
//! steps, then verifies the name and the commit chain.

pub mod compression;
pub mod config;
pub mod document;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod strategy;

pub use config::{Compression, PersistConfig};
pub use document::{Document, PAYLOAD_CLOSE, PAYLOAD_OPEN};
pub use error::{PersistError, PersistResult};
pub use orchestrator::{OpenReport, PersistenceOrchestrator, SaveReport};
pub use session::{PasswordChange, Session};
pub use state::SaveState;
pub use strategy::{
    select_strategy, DirectorySave, DownloadArtifact, DownloadFallback, HeadlessHost,
    HostCapabilities, SaveHandle, SaveOutcome, SaveStrategy,
};
