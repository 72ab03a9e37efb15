//! # File Continuity
//!
//! A verified file must start after the last committed file ends and, for
//! hash-chained kinds, declare the last file's hash as its previous hash.
//! An all-zero expected hash marks a chain boundary and accepts anything.

use crate::domain::errors::DownloaderError;
use mn_03_stream_files::StreamFile;
use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, Sha384Hash, StreamFilename};

/// The last committed file of one stream kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCursor {
    /// Uncompressed data filename.
    pub filename: StreamFilename,
    pub consensus_start: ConsensusTimestamp,
    pub consensus_end: ConsensusTimestamp,
    pub hash: Sha384Hash,
    pub index: Option<i64>,
    pub count: u64,
}

impl StreamCursor {
    pub fn new<F: StreamFile>(filename: &StreamFilename, file: &F) -> Self {
        Self {
            filename: filename.to_data(false),
            consensus_start: file.consensus_start(),
            consensus_end: file.consensus_end(),
            hash: file.hash(),
            index: file.index(),
            count: file.count(),
        }
    }
}

pub fn verify_hash_chain(
    filename: &str,
    expected: Option<&Sha384Hash>,
    actual: Option<&Sha384Hash>,
) -> Result<(), DownloaderError> {
    match (expected, actual) {
        (Some(expected), Some(actual)) if !expected.is_zero() && expected != actual => {
            Err(DownloaderError::HashChain {
                filename: filename.to_string(),
                expected: *expected,
                actual: *actual,
            })
        }
        _ => Ok(()),
    }
}

/// Checks `file` against the last committed file.
pub fn verify_continuity<F: StreamFile>(
    last: Option<&StreamCursor>,
    file: &F,
) -> Result<(), DownloaderError> {
    let Some(last) = last else {
        return Ok(());
    };
    if file.consensus_start() <= last.consensus_end {
        return Err(DownloaderError::OutOfOrder {
            filename: file.name().to_string(),
            previous_end: last.consensus_end,
            consensus_start: file.consensus_start(),
        });
    }
    verify_hash_chain(file.name(), Some(&last.hash), file.previous_hash().as_ref())
}
