//! Where saved documents go.
//!
//! A [`SaveStrategy`] performs the final write. Interactive strategies may be
//! cancelled by the user, which is reported as [`SaveOutcome::Cancelled`]
//! rather than an error. [`select_strategy`] picks the interactive strategy
//! offered by the host, if any, and otherwise falls back to producing a
//! download artifact.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{PersistError, PersistResult};

/// Opaque reference to where a document was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveHandle {
    pub location: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Succeeded(SaveHandle),
    Cancelled,
}

#[async_trait]
pub trait SaveStrategy: Send + Sync {
    /// Write `contents` under `suggested_name`.
    async fn write(&self, suggested_name: &str, contents: &[u8]) -> PersistResult<SaveOutcome>;

    fn name(&self) -> &'static str;
}

/// What the host environment can do for a save.
pub trait HostCapabilities {
    /// An interactive save (a picker the user may cancel), if available.
    fn interactive_save(&self) -> Option<Arc<dyn SaveStrategy>>;
}

/// Host with no interactive save capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessHost;

impl HostCapabilities for HeadlessHost {
    fn interactive_save(&self) -> Option<Arc<dyn SaveStrategy>> {
        None
    }
}

pub fn select_strategy(
    host: &dyn HostCapabilities,
    fallback: Arc<DownloadFallback>,
) -> Arc<dyn SaveStrategy> {
    match host.interactive_save() {
        Some(strategy) => {
            debug!(strategy = strategy.name(), "using interactive save");
            strategy
        }
        None => {
            debug!("no interactive save; using download fallback");
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// Download fallback
// ---------------------------------------------------------------------------

/// A document handed to the host as a download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Always succeeds; collects artifacts for the host to deliver.
#[derive(Debug, Default)]
pub struct DownloadFallback {
    artifacts: Mutex<Vec<DownloadArtifact>>,
}

impl DownloadFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<DownloadArtifact> {
        self.artifacts.lock().expect("lock poisoned").clone()
    }

    pub fn take_artifacts(&self) -> Vec<DownloadArtifact> {
        std::mem::take(&mut *self.artifacts.lock().expect("lock poisoned"))
    }
}

#[async_trait]
impl SaveStrategy for DownloadFallback {
    async fn write(&self, suggested_name: &str, contents: &[u8]) -> PersistResult<SaveOutcome> {
        self.artifacts.lock().expect("lock poisoned").push(DownloadArtifact {
            file_name: suggested_name.to_string(),
            bytes: contents.to_vec(),
        });
        info!(file = suggested_name, bytes = contents.len(), "download prepared");
        Ok(SaveOutcome::Succeeded(SaveHandle {
            location: format!("download:{suggested_name}"),
        }))
    }

    fn name(&self) -> &'static str {
        "download"
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Writes into a fixed directory.
#[derive(Clone, Debug)]
pub struct DirectorySave {
    dir: PathBuf,
}

impl DirectorySave {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveStrategy for DirectorySave {
    async fn write(&self, suggested_name: &str, contents: &[u8]) -> PersistResult<SaveOutcome> {
        let file_name = Path::new(suggested_name)
            .file_name()
            .ok_or_else(|| PersistError::Write(format!("invalid file name: {suggested_name}")))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| PersistError::Write(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), bytes = contents.len(), "document written");
        Ok(SaveOutcome::Succeeded(SaveHandle {
            location: path.display().to_string(),
        }))
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PickerHost;

    struct Picker;

    #[async_trait]
    impl SaveStrategy for Picker {
        async fn write(&self, _: &str, _: &[u8]) -> PersistResult<SaveOutcome> {
            Ok(SaveOutcome::Cancelled)
        }

        fn name(&self) -> &'static str {
            "picker"
        }
    }

    impl HostCapabilities for PickerHost {
        fn interactive_save(&self) -> Option<Arc<dyn SaveStrategy>> {
            Some(Arc::new(Picker))
        }
    }

    #[test]
    fn selection_prefers_interactive() {
        let fallback = Arc::new(DownloadFallback::new());
        assert_eq!(select_strategy(&PickerHost, fallback.clone()).name(), "picker");
        assert_eq!(select_strategy(&HeadlessHost, fallback).name(), "download");
    }

    #[tokio::test]
    async fn download_collects_artifacts() {
        let fallback = DownloadFallback::new();
        let outcome = fallback.write("notes.ab12cd34.html", b"<html>").await.unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Succeeded(SaveHandle {
                location: "download:notes.ab12cd34.html".into()
            })
        );
        let taken = fallback.take_artifacts();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].bytes, b"<html>");
        assert!(fallback.artifacts().is_empty());
    }

    #[tokio::test]
    async fn directory_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = DirectorySave::new(dir.path());
        let outcome = strategy.write("doc.0123abcd.html", b"hello").await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Succeeded(_)));
        let written = std::fs::read(dir.path().join("doc.0123abcd.html")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn directory_ignores_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = DirectorySave::new(dir.path());
        strategy.write("../escape.html", b"x").await.unwrap();
        assert!(dir.path().join("escape.html").exists());
    }

    #[tokio::test]
    async fn directory_missing_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = DirectorySave::new(dir.path().join("absent"));
        assert!(matches!(
            strategy.write("doc.html", b"x").await,
            Err(PersistError::Write(_))
        ));
    }
}
