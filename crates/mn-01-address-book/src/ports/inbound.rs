//! # Inbound Ports (Driving Ports)
//!
//! The downloader resolves the signer set for a file through
//! [`AddressBookApi::nodes_effective_at`]. The parser opens a stage per
//! record file and hands it back once the file's mutations are persisted.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use crate::domain::stage::AddressBookStage;
use shared_types::ConsensusTimestamp;
use std::sync::Arc;

pub trait AddressBookApi: Send + Sync {
    /// The snapshot with the greatest start not after `timestamp`.
    ///
    /// ## Errors
    ///
    /// - `NoneEffective`: `timestamp` precedes the bootstrap snapshot
    fn nodes_effective_at(
        &self,
        timestamp: ConsensusTimestamp,
    ) -> Result<Arc<AddressBook>, AddressBookError>;

    /// The most recent snapshot.
    fn current(&self) -> Arc<AddressBook>;

    /// Opens a stage seeded with the latest snapshot and the buffered
    /// partial uploads.
    fn stage(&self) -> AddressBookStage;

    /// Publishes a persisted stage. Returns the snapshots that were new.
    ///
    /// ## Errors
    ///
    /// - `OutOfOrder` / `Conflicting`: the stage does not extend the history
    fn commit(&self, stage: AddressBookStage) -> Result<Vec<Arc<AddressBook>>, AddressBookError>;
}
