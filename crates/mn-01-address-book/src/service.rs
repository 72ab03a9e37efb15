//! # Address Book Service
//!
//! Owns the shared history and the partial uploads carried between record
//! files.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use crate::domain::history::AddressBookHistory;
use crate::domain::stage::{AddressBookStage, PendingContents};
use crate::ports::inbound::AddressBookApi;
use crate::ports::outbound::AddressBookRepository;
use parking_lot::Mutex;
use shared_types::ConsensusTimestamp;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AddressBookService {
    history: AddressBookHistory,
    pending: Mutex<PendingContents>,
}

impl AddressBookService {
    pub fn new(bootstrap: AddressBook) -> Self {
        Self {
            history: AddressBookHistory::new(bootstrap),
            pending: Mutex::new(PendingContents::new()),
        }
    }

    /// Rebuilds the service from storage. Stored snapshots take precedence
    /// over the bootstrap book when both start at the same timestamp.
    pub fn restore(
        bootstrap: AddressBook,
        repository: &dyn AddressBookRepository,
    ) -> Result<Self, AddressBookError> {
        let (mut books, pending) = repository.load()?;
        let stored = books.len();
        books.push(bootstrap);
        let history = AddressBookHistory::from_snapshots(books)
            .ok_or_else(|| AddressBookError::Repository("no snapshots".to_string()))?;

        info!(
            stored,
            snapshots = history.len(),
            pending = pending.len(),
            "Address book history restored"
        );
        Ok(Self {
            history,
            pending: Mutex::new(pending),
        })
    }

    pub fn history(&self) -> &AddressBookHistory {
        &self.history
    }
}

impl AddressBookApi for AddressBookService {
    fn nodes_effective_at(
        &self,
        timestamp: ConsensusTimestamp,
    ) -> Result<Arc<AddressBook>, AddressBookError> {
        self.history.nodes_effective_at(timestamp)
    }

    fn current(&self) -> Arc<AddressBook> {
        self.history.current()
    }

    fn stage(&self) -> AddressBookStage {
        AddressBookStage::new(self.history.current(), self.pending.lock().clone())
    }

    fn commit(&self, stage: AddressBookStage) -> Result<Vec<Arc<AddressBook>>, AddressBookError> {
        if !stage.is_dirty() {
            return Ok(Vec::new());
        }
        let (completed, pending) = stage.into_parts();
        let mut appended = Vec::with_capacity(completed.len());
        for book in completed {
            let start = book.start_consensus_timestamp();
            match self.history.append(book) {
                Ok(true) => {
                    let current = self.history.current();
                    info!(
                        start,
                        nodes = current.len(),
                        total_stake = current.total_stake(),
                        "Address book appended"
                    );
                    appended.push(current);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(start, error = %e, "Address book rejected");
                    return Err(e);
                }
            }
        }
        *self.pending.lock() = pending;
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAddressBookRepository;
    use crate::domain::address_book::tests::book;
    use crate::domain::address_book::NODE_DETAILS_FILE_ID;
    use std::collections::HashMap;

    #[test]
    fn test_stage_and_commit() {
        let service = AddressBookService::new(book(0, &[1, 1]));
        let mut stage = service.stage();
        stage
            .on_file_update(NODE_DETAILS_FILE_ID, 99, &book(0, &[4, 4, 4]).to_bytes())
            .unwrap();

        // Nothing is visible before the commit.
        assert_eq!(service.nodes_effective_at(500).unwrap().len(), 2);

        let appended = service.commit(stage).unwrap();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].start_consensus_timestamp(), 100);
        assert_eq!(service.nodes_effective_at(99).unwrap().len(), 2);
        assert_eq!(service.nodes_effective_at(100).unwrap().len(), 3);
    }

    #[test]
    fn test_dropped_stage_leaves_no_trace() {
        let service = AddressBookService::new(book(0, &[1]));
        let mut stage = service.stage();
        stage.on_file_update(NODE_DETAILS_FILE_ID, 5, b"\x0a").unwrap();
        drop(stage);

        assert!(service.stage().pending().is_empty());
        assert_eq!(service.history().len(), 1);
    }

    #[test]
    fn test_pending_carries_across_files() {
        let service = AddressBookService::new(book(0, &[1]));
        let bytes = book(0, &[3, 3, 3, 3]).to_bytes();
        let (first, rest) = bytes.split_at(bytes.len() / 3);

        let mut stage = service.stage();
        stage.on_file_update(NODE_DETAILS_FILE_ID, 10, first).unwrap();
        assert!(service.commit(stage).unwrap().is_empty());

        let mut stage = service.stage();
        stage.on_file_append(NODE_DETAILS_FILE_ID, 20, rest).unwrap();
        let appended = service.commit(stage).unwrap();
        assert_eq!(appended[0].total_stake(), 12);
        assert!(service.stage().pending().is_empty());
    }

    #[test]
    fn test_replayed_commit_is_harmless() {
        let service = AddressBookService::new(book(0, &[1]));
        let mut stage = service.stage();
        stage.on_node_stakes(10, &HashMap::from([(0, 9)])).unwrap();
        let replay = stage.clone();

        assert_eq!(service.commit(stage).unwrap().len(), 1);
        assert!(service.commit(replay).unwrap().is_empty());
        assert_eq!(service.current().total_stake(), 9);
    }

    #[test]
    fn test_restore_prefers_stored() {
        let repository = InMemoryAddressBookRepository::default();
        repository
            .save(&[book(0, &[7]), book(50, &[8])], &PendingContents::new())
            .unwrap();

        let service = AddressBookService::restore(book(0, &[1]), &repository).unwrap();
        assert_eq!(service.history().len(), 2);
        assert_eq!(service.nodes_effective_at(10).unwrap().total_stake(), 7);
        assert_eq!(service.current().total_stake(), 8);
    }
}
