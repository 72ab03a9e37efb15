//! Version 6 record files.
//!
//! ```text
//! u32 version (= 6)
//! RecordStreamFile {
//!     hapi_proto_version, start_object_running_hash,
//!     record_stream_items[], end_object_running_hash, block_number
//! }
//! ```
//!
//! The running hash starts at the start hash and folds in every item as
//! `h' = SHA-384(h || SHA-384(transaction || record))`.

use super::{malformed, split_version, StreamFileReader};
use crate::domain::errors::StreamFileError;
use crate::domain::record_item::RecordItem;
use crate::domain::stream_file::{RecordFile, StreamFileData};
use crate::proto::{HashAlgorithm, HashObject, RecordStreamFile, RecordStreamItem};
use prost::Message;
use shared_types::{sha384, Sha384Hash};
use tracing::debug;

pub const RECORD_FILE_VERSION: u32 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFileReader;

impl StreamFileReader for RecordFileReader {
    type File = RecordFile;

    fn read(&self, data: &StreamFileData) -> Result<RecordFile, StreamFileError> {
        let filename = data.name();
        let (version, body) = split_version(&filename, data.bytes())?;
        if version != RECORD_FILE_VERSION {
            return Err(StreamFileError::UnsupportedVersion { filename, version });
        }

        let stream = RecordStreamFile::decode(body).map_err(|e| malformed(&filename, e))?;
        let start = running_hash(&filename, stream.start_object_running_hash.as_ref(), "start")?;
        let end = running_hash(&filename, stream.end_object_running_hash.as_ref(), "end")?;
        if stream.record_stream_items.is_empty() {
            return Err(malformed(&filename, "no record stream items"));
        }

        let mut running = start;
        let mut items = Vec::with_capacity(stream.record_stream_items.len());
        for (index, stream_item) in stream.record_stream_items.iter().enumerate() {
            running = next_running_hash(&running, stream_item);
            let item = RecordItem::decode(index, &stream_item.transaction, &stream_item.record)?;
            if let Some(previous) = items.last().map(RecordItem::consensus_timestamp) {
                if item.consensus_timestamp() <= previous {
                    return Err(StreamFileError::NonMonotonic {
                        filename,
                        previous,
                        current: item.consensus_timestamp(),
                    });
                }
            }
            items.push(item);
        }

        if running != end {
            return Err(StreamFileError::RunningHashMismatch {
                filename,
                declared: end,
                computed: running,
            });
        }

        let hapi = stream.hapi_proto_version.unwrap_or_default();
        let hapi_version = (hapi.major, hapi.minor, hapi.patch);
        let metadata_hash = metadata_hash(version, hapi_version, &start, &end, stream.block_number);
        let consensus_start = items.first().map_or(0, RecordItem::consensus_timestamp);
        let consensus_end = items.last().map_or(0, RecordItem::consensus_timestamp);

        debug!(
            filename = %filename,
            count = items.len(),
            block_number = stream.block_number,
            "Read record file"
        );

        Ok(RecordFile {
            name: filename,
            version,
            hapi_version,
            consensus_start,
            consensus_end,
            file_hash: data.hash(),
            metadata_hash,
            previous_hash: start,
            hash: end,
            index: stream.block_number,
            size: data.len(),
            node: None,
            items,
        })
    }
}

/// Folds one item into the running hash.
pub(crate) fn next_running_hash(current: &Sha384Hash, item: &RecordStreamItem) -> Sha384Hash {
    let item_hash = sha384(&[&item.transaction, &item.record]);
    sha384(&[current.as_bytes(), item_hash.as_bytes()])
}

/// Hash over the header fields signed by the metadata signature.
pub(crate) fn metadata_hash(
    version: u32,
    hapi_version: (i32, i32, i32),
    start: &Sha384Hash,
    end: &Sha384Hash,
    block_number: i64,
) -> Sha384Hash {
    let (major, minor, patch) = hapi_version;
    sha384(&[
        &version.to_be_bytes(),
        &major.to_be_bytes(),
        &minor.to_be_bytes(),
        &patch.to_be_bytes(),
        start.as_bytes(),
        end.as_bytes(),
        &block_number.to_be_bytes(),
    ])
}

fn running_hash(
    filename: &str,
    object: Option<&HashObject>,
    which: &str,
) -> Result<Sha384Hash, StreamFileError> {
    let object =
        object.ok_or_else(|| malformed(filename, format!("missing {which} running hash")))?;
    if object.algorithm != HashAlgorithm::Sha384 as i32 {
        return Err(malformed(
            filename,
            format!("{which} running hash algorithm {}", object.algorithm),
        ));
    }
    Sha384Hash::from_slice(&object.hash).map_err(|e| malformed(filename, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stream_file::StreamFile;
    use crate::domain::transaction_type::TransactionType;
    use crate::proto::{
        transaction_body::Data, CryptoTransferBody, Timestamp, TransactionBody,
        TransactionReceipt, TransactionRecord,
    };
    use crate::reader::RecordFileWriter;
    use shared_types::{StreamFilename, StreamType};

    fn body() -> TransactionBody {
        TransactionBody {
            data: Some(Data::CryptoTransfer(CryptoTransferBody::default())),
            ..Default::default()
        }
    }

    fn record(seconds: i64) -> TransactionRecord {
        TransactionRecord {
            receipt: Some(TransactionReceipt {
                status: 22,
                ..Default::default()
            }),
            consensus_timestamp: Some(Timestamp { seconds, nanos: 0 }),
            ..Default::default()
        }
    }

    fn data(bytes: Vec<u8>) -> StreamFileData {
        StreamFileData::new(StreamFilename::data(StreamType::Record, 0), bytes).unwrap()
    }

    fn writer() -> RecordFileWriter {
        RecordFileWriter::new(sha384(&[b"previous"]))
            .block_number(9)
            .item(&body(), &record(10))
            .item(&body(), &record(11))
    }

    #[test]
    fn test_read_valid_file() {
        let writer = writer();
        let expected_end = writer.end_running_hash();
        let bytes = writer.build();
        let file = RecordFileReader.read(&data(bytes.clone())).unwrap();

        assert_eq!(file.version, RECORD_FILE_VERSION);
        assert_eq!(file.count(), 2);
        assert_eq!(file.consensus_start, 10_000_000_000);
        assert_eq!(file.consensus_end, 11_000_000_000);
        assert_eq!(file.previous_hash, sha384(&[b"previous"]));
        assert_eq!(file.hash, expected_end);
        assert_eq!(file.index, 9);
        assert_eq!(file.file_hash, sha384(&[&bytes]));
        assert_eq!(file.items[1].transaction_type(), TransactionType::CryptoTransfer);
    }

    #[test]
    fn test_metadata_hash_covers_block_number() {
        let a = RecordFileReader.read(&data(writer().build())).unwrap();
        let b = RecordFileReader
            .read(&data(writer().block_number(10).build()))
            .unwrap();
        assert_ne!(a.file_hash, b.file_hash);
        assert_ne!(a.metadata_hash, b.metadata_hash);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = writer().build();
        bytes[3] = 5;
        let err = RecordFileReader.read(&data(bytes)).unwrap_err();
        assert!(matches!(err, StreamFileError::UnsupportedVersion { version: 5, .. }));
    }

    #[test]
    fn test_truncated_header_rejected() {
        let err = RecordFileReader.read(&data(vec![0, 0])).unwrap_err();
        assert!(matches!(err, StreamFileError::Truncated { len: 2, .. }));
    }

    #[test]
    fn test_truncated_body_rejected() {
        let bytes = writer().build();
        let cut = bytes[..bytes.len() - 10].to_vec();
        assert!(RecordFileReader.read(&data(cut)).is_err());
    }

    #[test]
    fn test_running_hash_mismatch_rejected() {
        let bytes = writer().end_running_hash_override(sha384(&[b"forged"])).build();
        let err = RecordFileReader.read(&data(bytes)).unwrap_err();
        assert!(matches!(err, StreamFileError::RunningHashMismatch { .. }));
    }

    #[test]
    fn test_non_monotonic_timestamps_rejected() {
        let bytes = RecordFileWriter::new(Sha384Hash::ZERO)
            .item(&body(), &record(11))
            .item(&body(), &record(11))
            .build();
        let err = RecordFileReader.read(&data(bytes)).unwrap_err();
        assert!(matches!(err, StreamFileError::NonMonotonic { .. }));
    }

    #[test]
    fn test_read_verified_checks_file_hash() {
        let bytes = writer().build();
        let err = RecordFileReader
            .read_verified(&data(bytes.clone()), &sha384(&[b"other"]))
            .unwrap_err();
        assert!(matches!(err, StreamFileError::FileHashMismatch { .. }));

        let hash = sha384(&[&bytes]);
        assert!(RecordFileReader.read_verified(&data(bytes), &hash).is_ok());
    }

    #[test]
    fn test_empty_file_rejected() {
        let bytes = RecordFileWriter::new(Sha384Hash::ZERO).build();
        let err = RecordFileReader.read(&data(bytes)).unwrap_err();
        assert!(matches!(err, StreamFileError::Malformed { .. }));
    }
}
