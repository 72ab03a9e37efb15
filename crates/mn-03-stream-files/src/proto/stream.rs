//! Stream file containers.

use super::basic::*;

/// Hash algorithm tag carried by [`HashObject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HashAlgorithm {
    Unknown = 0,
    Sha384 = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HashObject {
    #[prost(enumeration = "HashAlgorithm", tag = "1")]
    pub algorithm: i32,
    #[prost(int32, tag = "2")]
    pub length: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub hash: Vec<u8>,
}

/// One consensus transaction with its record.
///
/// Both fields hold the exact serialized messages, which the running hash
/// is computed over.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordStreamItem {
    /// Serialized [`Transaction`](super::Transaction).
    #[prost(bytes = "vec", tag = "1")]
    pub transaction: Vec<u8>,
    /// Serialized [`TransactionRecord`](super::TransactionRecord).
    #[prost(bytes = "vec", tag = "2")]
    pub record: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordStreamFile {
    #[prost(message, optional, tag = "1")]
    pub hapi_proto_version: Option<SemanticVersion>,
    #[prost(message, optional, tag = "2")]
    pub start_object_running_hash: Option<HashObject>,
    #[prost(message, repeated, tag = "3")]
    pub record_stream_items: Vec<RecordStreamItem>,
    #[prost(message, optional, tag = "4")]
    pub end_object_running_hash: Option<HashObject>,
    #[prost(int64, tag = "5")]
    pub block_number: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenUnitBalance {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(uint64, tag = "2")]
    pub balance: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SingleAccountBalances {
    #[prost(message, optional, tag = "1")]
    pub account_id: Option<AccountId>,
    #[prost(uint64, tag = "2")]
    pub hbar_balance: u64,
    #[prost(message, repeated, tag = "3")]
    pub token_unit_balances: Vec<TokenUnitBalance>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AllAccountBalances {
    #[prost(message, optional, tag = "1")]
    pub consensus_timestamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub all_accounts: Vec<SingleAccountBalances>,
}

impl HashObject {
    pub fn sha384(hash: &[u8]) -> Self {
        Self {
            algorithm: HashAlgorithm::Sha384 as i32,
            length: hash.len() as i32,
            hash: hash.to_vec(),
        }
    }
}
