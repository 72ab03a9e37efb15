//! # Stream Files
//!
//! Raw artifacts fetched from a node ([`StreamFileData`]) and the typed files
//! readers produce from them ([`RecordFile`], [`AccountBalanceFile`]).

use crate::domain::errors::StreamFileError;
use crate::domain::record_item::RecordItem;
use serde::{Deserialize, Serialize};
use shared_types::{sha384, ConsensusTimestamp, EntityId, Sha384Hash, StreamFilename, StreamType};

// =============================================================================
// RAW DATA
// =============================================================================

/// Bytes of one artifact as served by one node.
///
/// Compressed artifacts are inflated on construction so every consumer,
/// including the file hash, sees the logical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFileData {
    filename: StreamFilename,
    bytes: Vec<u8>,
}

impl StreamFileData {
    pub fn new(filename: StreamFilename, raw: Vec<u8>) -> Result<Self, StreamFileError> {
        let bytes = if filename.compressed {
            zstd::stream::decode_all(raw.as_slice()).map_err(|e| {
                StreamFileError::Decompression {
                    filename: filename.filename(),
                    reason: e.to_string(),
                }
            })?
        } else {
            raw
        };
        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &StreamFilename {
        &self.filename
    }

    pub fn name(&self) -> String {
        self.filename.filename()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// SHA-384 of the logical content.
    pub fn hash(&self) -> Sha384Hash {
        sha384(&[&self.bytes])
    }
}

// =============================================================================
// TYPED FILES
// =============================================================================

/// Header fields shared by every stream file kind.
pub trait StreamFile: Send + Sync + 'static {
    fn stream_type(&self) -> StreamType;

    fn name(&self) -> &str;

    fn consensus_start(&self) -> ConsensusTimestamp;

    fn consensus_end(&self) -> ConsensusTimestamp;

    /// Number of items in the file.
    fn count(&self) -> u64;

    /// SHA-384 over the whole content; the value nodes sign.
    fn file_hash(&self) -> Sha384Hash;

    /// Hash over header fields, signed separately. `None` when the format
    /// has none.
    fn metadata_hash(&self) -> Option<Sha384Hash>;

    /// Value the next file's previous hash must equal.
    fn hash(&self) -> Sha384Hash;

    /// `None` for kinds that are not hash-chained.
    fn previous_hash(&self) -> Option<Sha384Hash>;

    /// Block number, when the format carries one.
    fn index(&self) -> Option<i64>;

    fn size(&self) -> usize;

    /// Node account that served the canonical body.
    fn node(&self) -> Option<EntityId>;

    fn set_node(&mut self, node: EntityId);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFile {
    pub name: String,
    pub version: u32,
    pub hapi_version: (i32, i32, i32),
    pub consensus_start: ConsensusTimestamp,
    pub consensus_end: ConsensusTimestamp,
    pub file_hash: Sha384Hash,
    pub metadata_hash: Sha384Hash,
    /// Start object running hash.
    pub previous_hash: Sha384Hash,
    /// End object running hash.
    pub hash: Sha384Hash,
    pub index: i64,
    pub size: usize,
    pub node: Option<EntityId>,
    pub items: Vec<RecordItem>,
}

impl StreamFile for RecordFile {
    fn stream_type(&self) -> StreamType {
        StreamType::Record
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn consensus_start(&self) -> ConsensusTimestamp {
        self.consensus_start
    }

    fn consensus_end(&self) -> ConsensusTimestamp {
        self.consensus_end
    }

    fn count(&self) -> u64 {
        self.items.len() as u64
    }

    fn file_hash(&self) -> Sha384Hash {
        self.file_hash
    }

    fn metadata_hash(&self) -> Option<Sha384Hash> {
        Some(self.metadata_hash)
    }

    fn hash(&self) -> Sha384Hash {
        self.hash
    }

    fn previous_hash(&self) -> Option<Sha384Hash> {
        Some(self.previous_hash)
    }

    fn index(&self) -> Option<i64> {
        Some(self.index)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn node(&self) -> Option<EntityId> {
        self.node
    }

    fn set_node(&mut self, node: EntityId) {
        self.node = Some(node);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token_id: EntityId,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: EntityId,
    pub balance: i64,
    pub token_balances: Vec<TokenBalance>,
}

/// Snapshot of every account balance at one consensus instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalanceFile {
    pub name: String,
    pub version: u32,
    pub consensus_timestamp: ConsensusTimestamp,
    pub file_hash: Sha384Hash,
    pub size: usize,
    pub node: Option<EntityId>,
    pub balances: Vec<AccountBalance>,
}

impl StreamFile for AccountBalanceFile {
    fn stream_type(&self) -> StreamType {
        StreamType::Balance
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn consensus_start(&self) -> ConsensusTimestamp {
        self.consensus_timestamp
    }

    fn consensus_end(&self) -> ConsensusTimestamp {
        self.consensus_timestamp
    }

    fn count(&self) -> u64 {
        self.balances.len() as u64
    }

    fn file_hash(&self) -> Sha384Hash {
        self.file_hash
    }

    fn metadata_hash(&self) -> Option<Sha384Hash> {
        None
    }

    fn hash(&self) -> Sha384Hash {
        self.file_hash
    }

    fn previous_hash(&self) -> Option<Sha384Hash> {
        None
    }

    fn index(&self) -> Option<i64> {
        None
    }

    fn size(&self) -> usize {
        self.size
    }

    fn node(&self) -> Option<EntityId> {
        self.node
    }

    fn set_node(&mut self, node: EntityId) {
        self.node = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_data_is_inflated() {
        let content = b"record file content".to_vec();
        let compressed = zstd::stream::encode_all(content.as_slice(), 3).unwrap();
        let name = StreamFilename::data(StreamType::Record, 1).to_data(true);

        let data = StreamFileData::new(name, compressed).unwrap();
        assert_eq!(data.bytes(), content.as_slice());
        assert_eq!(data.hash(), sha384(&[&content]));
    }

    #[test]
    fn test_corrupt_compressed_data_fails() {
        let name = StreamFilename::data(StreamType::Record, 1).to_data(true);
        let err = StreamFileData::new(name, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StreamFileError::Decompression { .. }));
    }

    #[test]
    fn test_balance_file_is_not_chained() {
        let file = AccountBalanceFile {
            name: "x.pb".to_string(),
            version: 1,
            consensus_timestamp: 5,
            file_hash: sha384(&[b"x"]),
            size: 1,
            node: None,
            balances: vec![],
        };
        assert_eq!(file.previous_hash(), None);
        assert_eq!(file.metadata_hash(), None);
        assert_eq!(file.consensus_start(), file.consensus_end());
    }
}
