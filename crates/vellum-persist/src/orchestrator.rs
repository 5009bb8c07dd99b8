use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use vellum_chain::{ChainError, ChainReport, CommitChainStore};
use vellum_crypto::{CryptoProvider, CryptoResult, EnvelopeCodec};
use vellum_store::{DataStore, InMemoryDataStore};
use vellum_types::CommitHash;
use vellum_verify::{ContentAddressVerifier, VerificationResult};

use crate::compression;
use crate::config::PersistConfig;
use crate::document::Document;
use crate::error::{PersistError, PersistResult};
use crate::session::Session;
use crate::state::SaveState;
use crate::strategy::{SaveHandle, SaveOutcome, SaveStrategy};

/// Result of a save lifecycle that did not error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveReport {
    Committed {
        name: String,
        commit: CommitHash,
        handle: SaveHandle,
        encrypted: bool,
        payload_len: usize,
    },
    /// The user dismissed the save. Nothing was written; the tentative
    /// commit stays pending until the next save supersedes it.
    Cancelled {
        name: String,
        pending_commit: CommitHash,
    },
}

impl SaveReport {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Committed { name, .. } | Self::Cancelled { name, .. } => name,
        }
    }
}

/// What opening a document found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenReport {
    pub verification: VerificationResult,
    pub chain: ChainReport,
    pub encrypted: bool,
    pub compressed: bool,
    /// The document carried no payload and starts with an empty store.
    pub fresh: bool,
}

/// Drives saving and opening of one document.
///
/// A save runs `Exporting → Encoding → Addressing → Committing → Writing`
/// and ends `Committed`, `Cancelled` or `Failed`. The commit record is
/// appended as pending before the write and confirmed only once the write
/// succeeds. Because the store is exported before the commit is appended,
/// each written file carries the history up to the previous save.
pub struct PersistenceOrchestrator {
    config: PersistConfig,
    codec: EnvelopeCodec,
    verifier: ContentAddressVerifier,
    store: Arc<dyn DataStore>,
    chain: CommitChainStore,
    strategy: Arc<dyn SaveStrategy>,
    document: Document,
    name: String,
    state: SaveState,
    transitions: Vec<SaveState>,
}

impl PersistenceOrchestrator {
    /// Start a new, never-saved document.
    pub fn create(
        name: &str,
        title: &str,
        config: PersistConfig,
        strategy: Arc<dyn SaveStrategy>,
    ) -> PersistResult<Self> {
        let this = Self::assemble(
            config,
            Arc::new(InMemoryDataStore::new()),
            Document::blank(title),
            name,
            strategy,
        )?;
        this.chain.initialize_root()?;
        info!(name, "created document");
        Ok(this)
    }

    /// Open a saved document.
    ///
    /// Tampering and a damaged commit chain are reported, not raised. An
    /// encrypted payload needs the session password.
    pub async fn open(
        name: &str,
        text: impl Into<String>,
        session: &Session,
        config: PersistConfig,
        strategy: Arc<dyn SaveStrategy>,
    ) -> PersistResult<(Self, OpenReport)> {
        let document = Document::parse(text)?;
        let this = Self::assemble(
            config,
            Arc::new(InMemoryDataStore::new()),
            document,
            name,
            strategy,
        )?;

        let mut encrypted = false;
        let mut compressed = false;
        let payload = this.document.extract_payload()?;
        let fresh = payload.is_none();
        if let Some(bytes) = payload {
            let plain = if EnvelopeCodec::is_likely_encrypted(&bytes) {
                let password = session.password().ok_or(PersistError::PasswordRequired)?;
                encrypted = true;
                let codec = this.codec.clone();
                let password = password.clone();
                run_blocking(move || codec.decode(&bytes, password.expose())).await?
            } else {
                bytes
            };
            compressed = compression::is_compressed(&plain);
            let snapshot = compression::decompress_if_framed(plain)?;
            this.store.import(&snapshot)?;
        }

        let verification = this.verifier.verify(name, this.document.text());
        // A chain missing its root is reported below, not re-rooted.
        if this.chain.is_empty()? {
            this.chain.initialize_root()?;
        }
        let chain = this.chain.validate()?;

        info!(
            name,
            status = ?verification.status,
            encrypted,
            commits = chain.total_records,
            "opened document"
        );
        let report = OpenReport {
            verification,
            chain,
            encrypted,
            compressed,
            fresh,
        };
        Ok((this, report))
    }

    fn assemble(
        config: PersistConfig,
        store: Arc<dyn DataStore>,
        document: Document,
        name: &str,
        strategy: Arc<dyn SaveStrategy>,
    ) -> PersistResult<Self> {
        config.validate()?;
        let verifier = ContentAddressVerifier::new(config.prefix_len)?;
        let codec = EnvelopeCodec::new();
        Ok(Self {
            chain: CommitChainStore::new(store.clone()),
            config,
            codec,
            verifier,
            store,
            strategy,
            document,
            name: name.to_string(),
            state: SaveState::Idle,
            transitions: vec![SaveState::Idle],
        })
    }

    /// Replace the source of randomness used for salts and nonces.
    pub fn with_crypto_provider(mut self, provider: Arc<dyn CryptoProvider>) -> Self {
        self.codec = EnvelopeCodec::with_provider(provider);
        self
    }

    pub fn set_strategy(&mut self, strategy: Arc<dyn SaveStrategy>) {
        self.strategy = strategy;
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    /// The document's data store. Application edits go here.
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    pub fn chain(&self) -> &CommitChainStore {
        &self.chain
    }

    /// The document as last written (or as opened).
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// States visited by the current or most recent save.
    pub fn transitions(&self) -> &[SaveState] {
        &self.transitions
    }

    /// Save the document.
    ///
    /// Cancellation is `Ok(SaveReport::Cancelled)`. On error the state is
    /// `Failed` and any commit appended by this attempt is reverted.
    pub async fn save(
        &mut self,
        session: &mut Session,
        message: Option<&str>,
    ) -> PersistResult<SaveReport> {
        self.begin()?;
        if self.config.require_encryption && session.effective_password().is_none() {
            return Err(PersistError::PasswordRequired);
        }

        match self.run_save(session, message).await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!(name = %self.name, stage = %self.state, error = %e, "save failed");
                self.advance(SaveState::Failed);
                Err(e)
            }
        }
    }

    fn begin(&mut self) -> PersistResult<()> {
        if self.state.is_terminal() {
            self.advance(SaveState::Idle);
        }
        if self.state != SaveState::Idle {
            return Err(PersistError::SaveInProgress(self.state.to_string()));
        }
        self.transitions.clear();
        self.transitions.push(SaveState::Idle);
        Ok(())
    }

    async fn run_save(
        &mut self,
        session: &mut Session,
        message: Option<&str>,
    ) -> PersistResult<SaveReport> {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_commit_message.as_str())
            .to_string();

        self.advance(SaveState::Exporting);
        let superseded = self.chain.revert_pending()?;
        if superseded > 0 {
            debug!(superseded, "dropped pending commits from an earlier attempt");
        }
        let snapshot = self.store.export()?;

        self.advance(SaveState::Encoding);
        let packed = compression::compress(&snapshot, self.config.compression)?;
        let (payload, encrypted) = match session.effective_password() {
            Some(password) => {
                let codec = self.codec.clone();
                let password = password.clone();
                let sealed =
                    run_blocking(move || codec.encode(&packed, password.expose())).await?;
                (sealed, true)
            }
            None => (packed, false),
        };

        self.advance(SaveState::Addressing);
        let document = self.document.with_payload(&payload);
        let name = self
            .verifier
            .generate_addressed_name(&self.name, document.text())?;

        self.advance(SaveState::Committing);
        let parent = self.chain.head()?.ok_or(ChainError::NoRoot)?;
        let commit = self
            .chain
            .append_tentative(&message, &parent.hash, &snapshot)?;

        self.advance(SaveState::Writing);
        let outcome = match self.strategy.write(&name, document.text().as_bytes()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Err(revert) = self.chain.revert(&commit) {
                    warn!(commit = %commit.short_hex(), error = %revert, "could not revert commit");
                }
                return Err(e);
            }
        };

        match outcome {
            SaveOutcome::Succeeded(handle) => {
                self.chain.confirm(&commit)?;
                session.adopt_pending();
                self.document = document;
                self.name = name.clone();
                self.advance(SaveState::Committed);
                info!(
                    name = %name,
                    commit = %commit.short_hex(),
                    encrypted,
                    location = %handle.location,
                    "document saved"
                );
                Ok(SaveReport::Committed {
                    name,
                    commit,
                    handle,
                    encrypted,
                    payload_len: payload.len(),
                })
            }
            SaveOutcome::Cancelled => {
                self.advance(SaveState::Cancelled);
                warn!(name = %name, "save cancelled; edits kept");
                Ok(SaveReport::Cancelled {
                    name,
                    pending_commit: commit,
                })
            }
        }
    }

    /// Abandon an interrupted save and return to `Idle`.
    ///
    /// Needed only when a `save` future was dropped mid-flight. Pending
    /// commits are reverted.
    pub fn reset_lifecycle(&mut self) -> PersistResult<()> {
        let reverted = self.chain.revert_pending()?;
        debug!(from = %self.state, reverted, "save lifecycle reset");
        self.state = SaveState::Idle;
        self.transitions.clear();
        self.transitions.push(SaveState::Idle);
        Ok(())
    }

    /// End the session and wipe its secrets.
    pub fn close(self, session: &mut Session) {
        session.close();
        info!(name = %self.name, "closed document");
    }

    fn advance(&mut self, next: SaveState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid save transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "save state");
        self.state = next;
        self.transitions.push(next);
    }
}

/// Run key derivation and the cipher off the async executor.
async fn run_blocking<F>(task: F) -> PersistResult<Vec<u8>>
where
    F: FnOnce() -> CryptoResult<Vec<u8>> + Send + 'static,
{
    let output = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| PersistError::Task(e.to_string()))?;
    Ok(output?)
}

impl std::fmt::Debug for PersistenceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceOrchestrator")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
