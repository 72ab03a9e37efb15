//! # Stream File Readers
//!
//! Turn canonical bytes into typed files. Readers are pure: the same bytes
//! always produce the same file or the same error.
//!
//! Every container starts with a big-endian `u32` format version followed by
//! a protobuf body.

mod balance_file;
mod record_file;
mod writer;

pub use balance_file::{BalanceFileReader, BALANCE_FILE_VERSION};
pub use record_file::{RecordFileReader, RECORD_FILE_VERSION};
pub use writer::{BalanceFileWriter, RecordFileWriter};

use crate::domain::errors::StreamFileError;
use crate::domain::stream_file::{StreamFile, StreamFileData};
use shared_types::Sha384Hash;

pub(crate) const VERSION_LEN: usize = 4;

pub trait StreamFileReader: Send + Sync {
    type File: StreamFile;

    fn read(&self, data: &StreamFileData) -> Result<Self::File, StreamFileError>;

    /// Reads the file and checks its content against the hash nodes agreed on.
    fn read_verified(
        &self,
        data: &StreamFileData,
        expected: &Sha384Hash,
    ) -> Result<Self::File, StreamFileError> {
        let file = self.read(data)?;
        if file.file_hash() != *expected {
            return Err(StreamFileError::FileHashMismatch {
                filename: file.name().to_string(),
                expected: *expected,
                actual: file.file_hash(),
            });
        }
        Ok(file)
    }
}

/// Splits off the version prefix.
pub(crate) fn split_version<'a>(
    filename: &str,
    bytes: &'a [u8],
) -> Result<(u32, &'a [u8]), StreamFileError> {
    if bytes.len() < VERSION_LEN {
        return Err(StreamFileError::Truncated {
            filename: filename.to_string(),
            len: bytes.len(),
        });
    }
    let (version, body) = bytes.split_at(VERSION_LEN);
    let mut prefix = [0u8; VERSION_LEN];
    prefix.copy_from_slice(version);
    Ok((u32::from_be_bytes(prefix), body))
}

pub(crate) fn malformed(filename: &str, reason: impl ToString) -> StreamFileError {
    StreamFileError::Malformed {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}
