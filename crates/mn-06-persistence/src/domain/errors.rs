//! # Persistence Errors

use mn_01_address_book::AddressBookError;
use mn_05_record_parser::ParserError;
use thiserror::Error;

/// Failures of the key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    #[error("Store I/O failed: {message}")]
    IOError { message: String },

    #[error("Store is corrupted: {message}")]
    Corruption { message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] KVStoreError),

    #[error("Failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("Failed to decode {key}: {reason}")]
    Decode { key: String, reason: String },

    /// A cursor must only move forward.
    #[error("{stream_type} cursor at {committed} cannot move back to {consensus_end}")]
    CursorRegression {
        stream_type: &'static str,
        committed: i64,
        consensus_end: i64,
    },

    #[error("Invalid retention configuration: {0}")]
    InvalidConfig(String),
}

impl From<PersistenceError> for AddressBookError {
    fn from(e: PersistenceError) -> Self {
        AddressBookError::Repository(e.to_string())
    }
}

impl From<PersistenceError> for ParserError {
    fn from(e: PersistenceError) -> Self {
        ParserError::Lookup(e.to_string())
    }
}
