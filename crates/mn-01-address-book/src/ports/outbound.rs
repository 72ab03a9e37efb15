//! # Outbound Ports (Driven Ports)
//!
//! Storage of snapshots and partial uploads. The persistence crate writes
//! both inside the record file's batch; `save` exists for adapters that are
//! not part of that batch.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use crate::domain::stage::PendingContents;

pub trait AddressBookRepository: Send + Sync {
    /// Every stored snapshot, in any order, and the buffered partial uploads.
    fn load(&self) -> Result<(Vec<AddressBook>, PendingContents), AddressBookError>;

    /// Appends snapshots and replaces the buffered partial uploads.
    fn save(&self, books: &[AddressBook], pending: &PendingContents)
        -> Result<(), AddressBookError>;
}
