//! # Error Types
//!
//! Errors raised by the shared value types.

use thiserror::Error;

/// Errors constructing or parsing an [`EntityId`](crate::EntityId).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityIdError {
    /// A component is negative or wider than its bit field.
    #[error("Invalid entity id: {component}={value} outside 0..={max}")]
    InvalidEntityId {
        component: &'static str,
        value: i64,
        max: i64,
    },

    /// An encoded id was negative.
    #[error("Invalid encoded entity id: {0}")]
    NegativeEncoding(i64),

    /// The textual form was not `shard.realm.num`.
    #[error("Malformed entity id string: {0:?}")]
    Malformed(String),
}

/// Errors parsing a stream filename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// The extension matches no known stream type.
    #[error("Unknown stream file extension in {0:?}")]
    UnknownExtension(String),

    /// The instant part is not `YYYY-MM-DDTHH_MM_SS.nnnnnnnnnZ`.
    #[error("Invalid instant in stream filename {0:?}")]
    InvalidInstant(String),
}

/// Errors decoding a digest from hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// Input is not valid hex.
    #[error("Invalid hex digest: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong length.
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
