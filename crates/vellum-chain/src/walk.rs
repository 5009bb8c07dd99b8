use std::collections::HashSet;
use std::iter::FusedIterator;

use vellum_types::CommitHash;

use crate::error::{ChainError, ChainResult};
use crate::record::CommitRecord;
use crate::store::CommitChainStore;

/// Lazy walk from a commit back to the root.
///
/// Each step reads one record from the store. The walk yields an error and
/// then ends when a parent is missing ([`ChainError::BrokenChain`]), when a
/// hash repeats ([`ChainError::Cycle`]), or when a parent is not older than
/// its child ([`ChainError::OutOfOrder`]). Once finished it stays finished;
/// call [`CommitChainStore::chain`] again to start over.
pub struct ChainWalk<'a> {
    chain: &'a CommitChainStore,
    next: Option<CommitHash>,
    child: Option<(CommitHash, u64)>,
    visited: HashSet<CommitHash>,
    done: bool,
}

impl<'a> ChainWalk<'a> {
    pub(crate) fn new(chain: &'a CommitChainStore, from: CommitHash) -> Self {
        Self {
            chain,
            next: Some(from),
            child: None,
            visited: HashSet::new(),
            done: false,
        }
    }

    fn fail(&mut self, error: ChainError) -> Option<ChainResult<CommitRecord>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for ChainWalk<'_> {
    type Item = ChainResult<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(hash) = self.next.take() else {
            self.done = true;
            return None;
        };

        if !self.visited.insert(hash) {
            return self.fail(ChainError::Cycle(hash));
        }

        let record = match self.chain.get(&hash) {
            Ok(Some(record)) => record,
            Ok(None) => {
                let error = match self.child {
                    Some((child, _)) => ChainError::BrokenChain {
                        child,
                        missing_parent: hash,
                    },
                    None => ChainError::NotFound(hash),
                };
                return self.fail(error);
            }
            Err(e) => return self.fail(e),
        };

        if let Some((child, child_seq)) = self.child {
            if record.seq >= child_seq {
                return self.fail(ChainError::OutOfOrder {
                    child,
                    parent: hash,
                });
            }
        }

        self.child = Some((record.hash, record.seq));
        self.next = record.parent_hash;
        Some(Ok(record))
    }
}

impl FusedIterator for ChainWalk<'_> {}
