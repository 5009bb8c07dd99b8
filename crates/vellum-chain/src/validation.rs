use serde::Serialize;
use tracing::warn;

use vellum_types::CommitHash;

use crate::error::{ChainError, ChainResult};
use crate::store::CommitChainStore;

/// The first missing link found while walking from the head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub child: CommitHash,
    pub missing_parent: CommitHash,
}

/// Integrity summary of a commit chain.
///
/// Produced at load time. Every problem is reported, not raised: the
/// document still opens. Only a failure of the underlying store is an
/// error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Newest confirmed commit.
    pub head: Option<CommitHash>,
    /// Root reached by the walk, if it got that far.
    pub root: Option<CommitHash>,
    /// Records visited from head to root (or to the break).
    pub length: usize,
    /// Readable records.
    pub total_records: usize,
    /// Records without a parent. Exactly one in a healthy chain.
    pub root_count: usize,
    pub pending: usize,
    pub broken_link: Option<BrokenLink>,
    /// Keys of commit rows that could not be decoded.
    pub unreadable_rows: Vec<String>,
    /// Cycle, ordering violation or unreadable record met by the walk.
    pub violation: Option<String>,
}

impl ChainReport {
    pub(crate) fn build(chain: &CommitChainStore) -> ChainResult<Self> {
        let (records, unreadable_rows) = chain.records_lenient()?;
        let mut report = ChainReport {
            total_records: records.len(),
            root_count: records.iter().filter(|r| r.is_root()).count(),
            pending: records.iter().filter(|r| !r.is_confirmed()).count(),
            unreadable_rows,
            ..Default::default()
        };

        let head = records
            .iter()
            .filter(|r| r.is_confirmed())
            .max_by_key(|r| r.seq)
            .map(|r| r.hash);

        if let Some(head) = head {
            report.head = Some(head);
            for step in chain.chain(&head) {
                match step {
                    Ok(record) => {
                        report.length += 1;
                        if record.is_root() {
                            report.root = Some(record.hash);
                        }
                    }
                    Err(ChainError::BrokenChain {
                        child,
                        missing_parent,
                    }) => {
                        report.broken_link = Some(BrokenLink {
                            child,
                            missing_parent,
                        });
                    }
                    Err(ChainError::Store(e)) => return Err(ChainError::Store(e)),
                    Err(e) => report.violation = Some(e.to_string()),
                }
            }
        }

        if !report.is_intact() {
            warn!(
                length = report.length,
                root_count = report.root_count,
                unreadable = report.unreadable_rows.len(),
                broken = ?report.broken_link,
                violation = ?report.violation,
                "commit chain integrity warning"
            );
        }
        Ok(report)
    }

    /// `true` when the walk reached the only root without violations.
    pub fn is_intact(&self) -> bool {
        self.broken_link.is_none()
            && self.violation.is_none()
            && self.unreadable_rows.is_empty()
            && self.root_count == 1
            && (self.head.is_none() || self.root.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vellum_store::{DataStore, InMemoryDataStore};

    use super::*;
    use crate::store::COMMITS_TABLE;

    #[test]
    fn healthy_chain_is_intact() {
        let chain = CommitChainStore::new(Arc::new(InMemoryDataStore::new()));
        let mut head = chain.initialize_root().unwrap();
        for i in 0..3 {
            head = chain.append(&format!("v{i}"), &head, b"").unwrap();
        }
        chain.append_tentative("draft", &head, b"").unwrap();

        let report = chain.validate().unwrap();
        assert!(report.is_intact());
        assert_eq!(report.length, 4);
        assert_eq!(report.total_records, 5);
        assert_eq!(report.pending, 1);
        assert_eq!(report.head, Some(head));
    }

    #[test]
    fn deleted_middle_record_reports_break() {
        let data = Arc::new(InMemoryDataStore::new());
        let chain = CommitChainStore::new(data.clone());
        let root = chain.initialize_root().unwrap();
        let middle = chain.append("middle", &root, b"").unwrap();
        let head = chain.append("head", &middle, b"").unwrap();

        data.delete(COMMITS_TABLE, &middle.to_hex()).unwrap();

        let report = chain.validate().unwrap();
        assert!(!report.is_intact());
        assert_eq!(report.length, 1);
        assert_eq!(
            report.broken_link,
            Some(BrokenLink {
                child: head,
                missing_parent: middle
            })
        );
        assert!(report.root.is_none());
    }

    #[test]
    fn missing_root_is_reported() {
        let data = Arc::new(InMemoryDataStore::new());
        let chain = CommitChainStore::new(data.clone());
        let root = chain.initialize_root().unwrap();
        let head = chain.append("only", &root, b"").unwrap();

        data.delete(COMMITS_TABLE, &root.to_hex()).unwrap();

        let report = chain.validate().unwrap();
        assert!(!report.is_intact());
        assert_eq!(report.root_count, 0);
        assert_eq!(report.head, Some(head));
        assert_eq!(report.broken_link.unwrap().missing_parent, root);
    }

    #[test]
    fn unreadable_rows_are_reported() {
        let data = Arc::new(InMemoryDataStore::new());
        let chain = CommitChainStore::new(data.clone());
        let root = chain.initialize_root().unwrap();
        let head = chain.append("edit", &root, b"").unwrap();
        data.put(COMMITS_TABLE, "garbage", b"not json").unwrap();
        // An unreadable row on the walk's path stops the walk.
        data.put(COMMITS_TABLE, &root.to_hex(), b"{").unwrap();

        let report = chain.validate().unwrap();
        assert!(!report.is_intact());
        assert_eq!(report.unreadable_rows.len(), 2);
        assert!(report.unreadable_rows.contains(&"garbage".to_string()));
        assert_eq!(report.head, Some(head));
        assert_eq!(report.length, 1);
        assert!(report.violation.is_some());
    }

    #[test]
    fn empty_chain_is_not_intact() {
        let chain = CommitChainStore::new(Arc::new(InMemoryDataStore::new()));
        let report = chain.validate().unwrap();
        assert_eq!(report.root_count, 0);
        assert!(!report.is_intact());
    }
}
