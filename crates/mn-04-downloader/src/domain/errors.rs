//! # Downloader Errors

use crate::domain::state::RoundState;
use mn_01_address_book::AddressBookError;
use mn_02_signature_verification::SignatureError;
use mn_03_stream_files::{ProviderError, StreamFileError};
use shared_types::{ConsensusTimestamp, Sha384Hash};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloaderError {
    #[error(transparent)]
    AddressBook(#[from] AddressBookError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    StreamFile(#[from] StreamFileError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Nodes agreed on a hash but none served a body with that hash.
    #[error("No node served a body of {filename} matching {hash}")]
    NoMatchingBody { filename: String, hash: Sha384Hash },

    #[error("Metadata hash of {filename} is {actual}, nodes signed {expected}")]
    MetadataHashMismatch {
        filename: String,
        expected: Sha384Hash,
        actual: Sha384Hash,
    },

    /// `previous_hash(n)` must equal `hash(n - 1)`.
    #[error("Hash chain broken at {filename}: expected previous {expected}, got {actual}")]
    HashChain {
        filename: String,
        expected: Sha384Hash,
        actual: Sha384Hash,
    },

    #[error("{filename} starts at {consensus_start}, not after previous end {previous_end}")]
    OutOfOrder {
        filename: String,
        previous_end: ConsensusTimestamp,
        consensus_start: ConsensusTimestamp,
    },

    #[error("Illegal round transition {from:?} -> {to:?}")]
    InvalidTransition { from: RoundState, to: RoundState },

    #[error("{stage} timed out")]
    Timeout { stage: &'static str },

    /// Parsing or persisting a verified file failed.
    #[error("Consumer failed: {0}")]
    Consumer(String),

    #[error("Leader lease {path}: {reason}")]
    Lease { path: String, reason: String },
}
