use std::sync::Arc;

use tracing::{debug, info};

use vellum_store::DataStore;
use vellum_types::{unix_millis, CommitHash};

use crate::error::{ChainError, ChainResult};
use crate::record::{compute_commit_hash, CommitRecord, CommitState, ROOT_MESSAGE};
use crate::validation::ChainReport;
use crate::walk::ChainWalk;

/// Table holding one row per commit, keyed by hex hash.
pub const COMMITS_TABLE: &str = "commits";

/// Commit chain kept in a document's data store.
pub struct CommitChainStore {
    store: Arc<dyn DataStore>,
}

impl CommitChainStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Number of records, pending ones included.
    pub fn len(&self) -> ChainResult<usize> {
        Ok(self.store.count(COMMITS_TABLE)?)
    }

    pub fn is_empty(&self) -> ChainResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Look up a record by hash.
    pub fn get(&self, hash: &CommitHash) -> ChainResult<Option<CommitRecord>> {
        self.store
            .get(COMMITS_TABLE, &hash.to_hex())?
            .map(|row| CommitRecord::from_row(&row))
            .transpose()
    }

    /// All records in sequence order.
    pub fn records(&self) -> ChainResult<Vec<CommitRecord>> {
        let mut records = self
            .store
            .scan(COMMITS_TABLE)?
            .iter()
            .map(|(_, row)| CommitRecord::from_row(row))
            .collect::<ChainResult<Vec<_>>>()?;
        records.sort_by_key(|r| r.seq);
        Ok(records)
    }

    /// Readable records in sequence order, plus the keys of rows that do
    /// not decode.
    pub(crate) fn records_lenient(&self) -> ChainResult<(Vec<CommitRecord>, Vec<String>)> {
        let mut records = Vec::new();
        let mut unreadable = Vec::new();
        for (key, row) in self.store.scan(COMMITS_TABLE)? {
            match CommitRecord::from_row(&row) {
                Ok(record) => records.push(record),
                Err(_) => unreadable.push(key),
            }
        }
        records.sort_by_key(|r| r.seq);
        Ok((records, unreadable))
    }

    /// Create the root commit if the chain is empty.
    ///
    /// Returns the root hash either way. First run is detected by counting
    /// records, so calling this repeatedly never creates a second root.
    pub fn initialize_root(&self) -> ChainResult<CommitHash> {
        if self.len()? > 0 {
            return self.root();
        }
        let created_at_ms = unix_millis();
        let hash = compute_commit_hash(&[], created_at_ms, ROOT_MESSAGE, None);
        let record = CommitRecord {
            hash,
            parent_hash: None,
            message: ROOT_MESSAGE.to_string(),
            created_at_ms,
            seq: 0,
            state: CommitState::Confirmed,
        };
        self.store
            .insert(COMMITS_TABLE, &hash.to_hex(), &record.to_row()?)?;
        info!(root = %hash.short_hex(), "initialized commit chain");
        Ok(hash)
    }

    /// The unique record without a parent.
    pub fn root(&self) -> ChainResult<CommitHash> {
        self.records()?
            .into_iter()
            .find(CommitRecord::is_root)
            .map(|r| r.hash)
            .ok_or(ChainError::NoRoot)
    }

    /// Newest confirmed record.
    pub fn head(&self) -> ChainResult<Option<CommitRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(CommitRecord::is_confirmed)
            .max_by_key(|r| r.seq))
    }

    /// Records still awaiting confirmation.
    pub fn pending(&self) -> ChainResult<Vec<CommitRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| !r.is_confirmed())
            .collect())
    }

    /// Append a confirmed commit on top of `parent`.
    pub fn append(
        &self,
        message: &str,
        parent: &CommitHash,
        snapshot: &[u8],
    ) -> ChainResult<CommitHash> {
        self.append_at(message, parent, snapshot, unix_millis(), CommitState::Confirmed)
    }

    /// Append a pending commit to be confirmed or reverted after the write.
    pub fn append_tentative(
        &self,
        message: &str,
        parent: &CommitHash,
        snapshot: &[u8],
    ) -> ChainResult<CommitHash> {
        self.append_at(message, parent, snapshot, unix_millis(), CommitState::Pending)
    }

    /// Append with an explicit timestamp.
    ///
    /// If a record with the resulting hash already exists nothing is
    /// inserted and that hash is returned, so retries are safe. A retry
    /// asking for `Confirmed` confirms an existing pending record; a retry
    /// asking for `Pending` never downgrades a confirmed one.
    pub fn append_at(
        &self,
        message: &str,
        parent: &CommitHash,
        snapshot: &[u8],
        created_at_ms: u64,
        state: CommitState,
    ) -> ChainResult<CommitHash> {
        let hash = compute_commit_hash(snapshot, created_at_ms, message, Some(parent));
        if let Some(existing) = self.get(&hash)? {
            if state == CommitState::Confirmed && !existing.is_confirmed() {
                self.confirm(&hash)?;
            } else {
                debug!(commit = %hash.short_hex(), "commit already present, append skipped");
            }
            return Ok(hash);
        }

        let parent_record = self.get(parent)?.ok_or(ChainError::BrokenChain {
            child: hash,
            missing_parent: *parent,
        })?;
        if !parent_record.is_confirmed() {
            return Err(ChainError::PendingParent(*parent));
        }
        self.ensure_head(parent)?;

        let seq = self
            .records()?
            .last()
            .map_or(0, |r| r.seq)
            .max(parent_record.seq)
            + 1;
        let record = CommitRecord {
            hash,
            parent_hash: Some(*parent),
            message: message.to_string(),
            created_at_ms,
            seq,
            state,
        };

        self.store
            .insert(COMMITS_TABLE, &hash.to_hex(), &record.to_row()?)?;
        debug!(
            commit = %hash.short_hex(),
            parent = %parent.short_hex(),
            seq,
            ?state,
            "appended commit"
        );
        Ok(hash)
    }

    /// Mark a pending commit as confirmed. Confirming twice is a no-op.
    pub fn confirm(&self, hash: &CommitHash) -> ChainResult<CommitRecord> {
        let mut record = self.get(hash)?.ok_or(ChainError::NotFound(*hash))?;
        if record.state == CommitState::Pending {
            if let Some(parent) = &record.parent_hash {
                self.ensure_head(parent)?;
            }
            record.state = CommitState::Confirmed;
            self.store
                .put(COMMITS_TABLE, &hash.to_hex(), &record.to_row()?)?;
            debug!(commit = %hash.short_hex(), "confirmed commit");
        }
        Ok(record)
    }

    /// Remove a pending commit. Returns `false` if it was not present.
    pub fn revert(&self, hash: &CommitHash) -> ChainResult<bool> {
        match self.get(hash)? {
            None => Ok(false),
            Some(record) if record.is_confirmed() => Err(ChainError::CannotRevertConfirmed(*hash)),
            Some(_) => {
                let removed = self.store.delete(COMMITS_TABLE, &hash.to_hex())?;
                debug!(commit = %hash.short_hex(), "reverted pending commit");
                Ok(removed)
            }
        }
    }

    /// Revert every pending commit; returns how many were removed.
    pub fn revert_pending(&self) -> ChainResult<usize> {
        let mut removed = 0;
        for record in self.pending()? {
            if self.revert(&record.hash)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    // Only the head may gain a confirmed child; the history is a list.
    fn ensure_head(&self, parent: &CommitHash) -> ChainResult<()> {
        match self.head()? {
            Some(head) if head.hash == *parent => Ok(()),
            Some(head) => Err(ChainError::NotHead {
                parent: *parent,
                head: head.hash,
            }),
            None => Err(ChainError::NoRoot),
        }
    }

    /// Walk from `from` back to the root.
    pub fn chain(&self, from: &CommitHash) -> ChainWalk<'_> {
        ChainWalk::new(self, *from)
    }

    /// Delete all history and start over with a fresh root.
    pub fn reset_history(&self) -> ChainResult<CommitHash> {
        let removed = self.store.clear_table(COMMITS_TABLE)?;
        info!(removed, "reset commit history");
        self.initialize_root()
    }

    /// Walk the chain from the current head and summarize its integrity.
    pub fn validate(&self) -> ChainResult<ChainReport> {
        ChainReport::build(self)
    }
}

impl std::fmt::Debug for CommitChainStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitChainStore")
            .field("records", &self.len().ok())
            .finish()
    }
}
