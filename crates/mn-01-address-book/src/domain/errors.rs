//! # Address Book Errors

use shared_types::{ConsensusTimestamp, EntityId, EntityIdError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressBookError {
    /// Snapshots must list at least one node.
    #[error("Address book {file_id} has no nodes")]
    Empty { file_id: EntityId },

    #[error("Node {node_id} appears more than once")]
    DuplicateNode { node_id: i64 },

    #[error("Node {node_id} has an invalid public key: {reason}")]
    InvalidPublicKey { node_id: i64, reason: String },

    #[error("Node {node_id} has no account id")]
    MissingNodeAccount { node_id: i64 },

    #[error("Address book bytes do not decode: {0}")]
    Decode(String),

    /// Snapshots are appended in consensus order.
    #[error("Address book starting at {start} precedes latest snapshot at {latest}")]
    OutOfOrder {
        start: ConsensusTimestamp,
        latest: ConsensusTimestamp,
    },

    #[error("A different address book already starts at {start}")]
    Conflicting { start: ConsensusTimestamp },

    #[error("No address book is effective at {timestamp}")]
    NoneEffective { timestamp: ConsensusTimestamp },

    #[error("Address book storage failed: {0}")]
    Repository(String),

    #[error("Failed to read bootstrap address book {path}: {reason}")]
    Bootstrap { path: String, reason: String },

    #[error(transparent)]
    EntityId(#[from] EntityIdError),
}
