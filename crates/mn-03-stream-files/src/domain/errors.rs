//! # Stream File Errors

use shared_types::{EntityIdError, Sha384Hash};
use thiserror::Error;

/// A stream file body could not be turned into a typed file.
///
/// Every variant means the copy is unusable; the downloader retries the
/// round rather than skipping the file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamFileError {
    #[error("{filename}: truncated after {len} bytes")]
    Truncated { filename: String, len: usize },

    #[error("{filename}: unsupported format version {version}")]
    UnsupportedVersion { filename: String, version: u32 },

    #[error("{filename}: malformed body: {reason}")]
    Malformed { filename: String, reason: String },

    #[error("{filename}: end running hash {declared} does not match computed {computed}")]
    RunningHashMismatch {
        filename: String,
        declared: Sha384Hash,
        computed: Sha384Hash,
    },

    #[error("{filename}: file hash {actual} does not match verified hash {expected}")]
    FileHashMismatch {
        filename: String,
        expected: Sha384Hash,
        actual: Sha384Hash,
    },

    #[error("{filename}: consensus timestamp {current} is not after {previous}")]
    NonMonotonic {
        filename: String,
        previous: i64,
        current: i64,
    },

    #[error("{filename}: zstd decompression failed: {reason}")]
    Decompression { filename: String, reason: String },

    #[error("record item {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error(transparent)]
    EntityId(#[from] EntityIdError),
}

/// A provider could not return the requested artifact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{path} not found")]
    NotFound { path: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("{path} exceeds the maximum file size of {max} bytes")]
    TooLarge { path: String, max: u64 },

    /// Raw bytes were fetched but could not be prepared (e.g. decompressed).
    #[error(transparent)]
    Content(#[from] StreamFileError),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}
