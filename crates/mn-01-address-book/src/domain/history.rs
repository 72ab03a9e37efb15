//! # Address Book History
//!
//! Append-only sequence of snapshots ordered by start timestamp. Readers get
//! `Arc` handles, so a download in flight keeps its view while a newer
//! snapshot is appended.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use parking_lot::RwLock;
use shared_types::ConsensusTimestamp;
use std::sync::Arc;

#[derive(Debug)]
pub struct AddressBookHistory {
    snapshots: RwLock<Vec<Arc<AddressBook>>>,
}

impl AddressBookHistory {
    pub fn new(bootstrap: AddressBook) -> Self {
        Self {
            snapshots: RwLock::new(vec![Arc::new(bootstrap)]),
        }
    }

    /// Rebuilds a history from stored snapshots, which must be non-empty.
    pub fn from_snapshots(mut books: Vec<AddressBook>) -> Option<Self> {
        books.sort_by_key(|book| book.start_consensus_timestamp());
        books.dedup_by_key(|book| book.start_consensus_timestamp());
        if books.is_empty() {
            return None;
        }
        Some(Self {
            snapshots: RwLock::new(books.into_iter().map(Arc::new).collect()),
        })
    }

    /// Appends a snapshot. Returns `false` when an identical snapshot with
    /// the same start already exists, so replays are harmless.
    pub fn append(&self, book: AddressBook) -> Result<bool, AddressBookError> {
        let mut snapshots = self.snapshots.write();
        if let Some(latest) = snapshots.last() {
            let start = book.start_consensus_timestamp();
            let latest_start = latest.start_consensus_timestamp();
            if start == latest_start {
                if **latest == book {
                    return Ok(false);
                }
                return Err(AddressBookError::Conflicting { start });
            }
            if start < latest_start {
                if snapshots.iter().any(|existing| **existing == book) {
                    return Ok(false);
                }
                return Err(AddressBookError::OutOfOrder {
                    start,
                    latest: latest_start,
                });
            }
        }
        snapshots.push(Arc::new(book));
        Ok(true)
    }

    /// The snapshot with the greatest start not after `timestamp`.
    pub fn nodes_effective_at(
        &self,
        timestamp: ConsensusTimestamp,
    ) -> Result<Arc<AddressBook>, AddressBookError> {
        let snapshots = self.snapshots.read();
        let idx = snapshots.partition_point(|book| book.start_consensus_timestamp() <= timestamp);
        if idx == 0 {
            return Err(AddressBookError::NoneEffective { timestamp });
        }
        Ok(Arc::clone(&snapshots[idx - 1]))
    }

    pub fn current(&self) -> Arc<AddressBook> {
        let snapshots = self.snapshots.read();
        // Never empty: constructors require a snapshot and nothing removes one.
        Arc::clone(&snapshots[snapshots.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }

    pub fn snapshots(&self) -> Vec<Arc<AddressBook>> {
        self.snapshots.read().clone()
    }
}
