//! # Parser Errors

use mn_01_address_book::AddressBookError;
use mn_03_stream_files::{StreamFileError, TransactionType};
use shared_types::{ConsensusTimestamp, EntityIdError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error(transparent)]
    StreamFile(#[from] StreamFileError),

    #[error(transparent)]
    EntityId(#[from] EntityIdError),

    #[error(transparent)]
    AddressBook(#[from] AddressBookError),

    /// A recoverable inconsistency while `halt_on_error` is set.
    #[error("Halting on recoverable error at {consensus_timestamp}: {message}")]
    Recoverable {
        consensus_timestamp: ConsensusTimestamp,
        message: String,
    },

    /// The registry resolved a kind to a handler of another kind.
    #[error("Handler registered for {expected} reports {actual}")]
    HandlerMismatch {
        expected: TransactionType,
        actual: TransactionType,
    },

    /// No entity is known under an alias or EVM address.
    #[error("No entity found for {kind} {value}")]
    Unresolved { kind: &'static str, value: String },

    #[error("Entity lookup failed: {0}")]
    Lookup(String),

    #[error("Item at {consensus_timestamp} does not follow {previous}")]
    NonMonotonic {
        previous: ConsensusTimestamp,
        consensus_timestamp: ConsensusTimestamp,
    },
}

impl ParserError {
    /// Whether parsing may continue with the EMPTY id in place of the
    /// entity that failed to resolve.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ParserError::Unresolved { .. } | ParserError::EntityId(_))
    }
}
