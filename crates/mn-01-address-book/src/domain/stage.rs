//! # Address Book Stage
//!
//! Collects address book changes observed while one record file is parsed.
//! Nothing here touches the shared history: the stage is persisted together
//! with the file's other mutations and only then committed.
//!
//! Large books are uploaded as a `FileUpdate` followed by `FileAppend`s. The
//! partial contents are buffered per file id until they decode into a
//! non-empty book. A snapshot starts one nanosecond after the transaction
//! that completed it.

use crate::domain::address_book::{is_address_book_file, AddressBook};
use crate::domain::errors::AddressBookError;
use shared_types::{ConsensusTimestamp, EntityId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Partial file contents keyed by file id.
pub type PendingContents = BTreeMap<EntityId, Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBookStage {
    pending: PendingContents,
    completed: Vec<AddressBook>,
    latest: Arc<AddressBook>,
    dirty: bool,
}

impl AddressBookStage {
    pub fn new(latest: Arc<AddressBook>, pending: PendingContents) -> Self {
        Self {
            pending,
            completed: Vec::new(),
            latest,
            dirty: false,
        }
    }

    /// Handles a successful `FileUpdate`: replaces the buffered contents.
    pub fn on_file_update(
        &mut self,
        file_id: EntityId,
        consensus_timestamp: ConsensusTimestamp,
        contents: &[u8],
    ) -> Result<Option<&AddressBook>, AddressBookError> {
        if !is_address_book_file(file_id) {
            return Ok(None);
        }
        self.pending.insert(file_id, contents.to_vec());
        self.dirty = true;
        self.try_complete(file_id, consensus_timestamp)
    }

    /// Handles a successful `FileAppend`: extends the buffered contents.
    pub fn on_file_append(
        &mut self,
        file_id: EntityId,
        consensus_timestamp: ConsensusTimestamp,
        contents: &[u8],
    ) -> Result<Option<&AddressBook>, AddressBookError> {
        if !is_address_book_file(file_id) {
            return Ok(None);
        }
        self.pending
            .entry(file_id)
            .or_default()
            .extend_from_slice(contents);
        self.dirty = true;
        self.try_complete(file_id, consensus_timestamp)
    }

    /// Applies a node stake update on top of the latest known book.
    pub fn on_node_stakes(
        &mut self,
        consensus_timestamp: ConsensusTimestamp,
        stakes: &HashMap<i64, u64>,
    ) -> Result<&AddressBook, AddressBookError> {
        let book = self.latest.with_stakes(consensus_timestamp + 1, stakes)?;
        info!(
            start = book.start_consensus_timestamp(),
            total_stake = book.total_stake(),
            "Staged address book stake update"
        );
        Ok(self.push(book))
    }

    fn try_complete(
        &mut self,
        file_id: EntityId,
        consensus_timestamp: ConsensusTimestamp,
    ) -> Result<Option<&AddressBook>, AddressBookError> {
        let Some(contents) = self.pending.get(&file_id) else {
            return Ok(None);
        };
        let len = contents.len();
        match AddressBook::from_bytes(file_id, consensus_timestamp + 1, contents) {
            Ok(book) => {
                self.pending.remove(&file_id);
                info!(
                    file_id = %file_id,
                    start = book.start_consensus_timestamp(),
                    nodes = book.len(),
                    "Staged address book"
                );
                Ok(Some(self.push(book)))
            }
            Err(AddressBookError::Decode(_)) | Err(AddressBookError::Empty { .. }) => {
                debug!(
                    file_id = %file_id,
                    len,
                    "Address book contents incomplete"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn push(&mut self, book: AddressBook) -> &AddressBook {
        let book = Arc::new(book);
        self.latest = Arc::clone(&book);
        self.completed.push((*book).clone());
        self.dirty = true;
        &self.completed[self.completed.len() - 1]
    }

    pub fn completed(&self) -> &[AddressBook] {
        &self.completed
    }

    pub fn pending(&self) -> &PendingContents {
        &self.pending
    }

    /// Whether anything must be persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn into_parts(self) -> (Vec<AddressBook>, PendingContents) {
        (self.completed, self.pending)
    }
}
