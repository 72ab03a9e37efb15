//! Identifier and value messages shared by every body and record.

use shared_types::{timestamp, ConsensusTimestamp, EntityId, EntityIdError};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountId {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub account_num: i64,
    /// Public key or EVM address alias; set instead of `account_num`.
    #[prost(bytes = "vec", tag = "4")]
    pub alias: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractId {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub contract_num: i64,
    /// 20-byte EVM address; set instead of `contract_num`.
    #[prost(bytes = "vec", tag = "4")]
    pub evm_address: Vec<u8>,
}

/// `shard.realm.num` message used for files, topics, tokens and schedules.
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ShardRealmNum {
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    #[prost(int64, tag = "3")]
    pub num: i64,
}

pub type FileId = ShardRealmNum;
pub type TopicId = ShardRealmNum;
pub type TokenId = ShardRealmNum;
pub type ScheduleId = ShardRealmNum;

#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionId {
    #[prost(message, optional, tag = "1")]
    pub transaction_valid_start: Option<Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    #[prost(bool, tag = "3")]
    pub scheduled: bool,
    /// Non-zero for child transactions.
    #[prost(int32, tag = "4")]
    pub nonce: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(bytes = "vec", tag = "2")]
    pub ed25519: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub ecdsa_secp256k1: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceEndpoint {
    #[prost(bytes = "vec", tag = "1")]
    pub ip_address_v4: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub port: i32,
    #[prost(string, tag = "3")]
    pub domain_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountAmount {
    #[prost(message, optional, tag = "1")]
    pub account_id: Option<AccountId>,
    #[prost(sint64, tag = "2")]
    pub amount: i64,
    #[prost(bool, tag = "3")]
    pub is_approval: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferList {
    #[prost(message, repeated, tag = "1")]
    pub account_amounts: Vec<AccountAmount>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NftTransfer {
    #[prost(message, optional, tag = "1")]
    pub sender_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "2")]
    pub receiver_account_id: Option<AccountId>,
    #[prost(int64, tag = "3")]
    pub serial_number: i64,
    #[prost(bool, tag = "4")]
    pub is_approval: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenTransferList {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(message, repeated, tag = "2")]
    pub transfers: Vec<AccountAmount>,
    #[prost(message, repeated, tag = "3")]
    pub nft_transfers: Vec<NftTransfer>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NftId {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(int64, tag = "2")]
    pub serial_number: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PendingAirdropId {
    #[prost(message, optional, tag = "1")]
    pub sender_id: Option<AccountId>,
    #[prost(message, optional, tag = "2")]
    pub receiver_id: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub fungible_token_type: Option<TokenId>,
    #[prost(message, optional, tag = "4")]
    pub non_fungible_token: Option<NftId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SemanticVersion {
    #[prost(int32, tag = "1")]
    pub major: i32,
    #[prost(int32, tag = "2")]
    pub minor: i32,
    #[prost(int32, tag = "3")]
    pub patch: i32,
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl ShardRealmNum {
    pub fn to_entity_id(&self) -> Result<EntityId, EntityIdError> {
        EntityId::encode(self.shard_num, self.realm_num, self.num)
    }

    pub fn from_entity_id(id: EntityId) -> Self {
        Self {
            shard_num: id.shard(),
            realm_num: id.realm(),
            num: id.num(),
        }
    }
}

impl AccountId {
    /// The numeric id; `None` when the account is addressed by alias.
    pub fn to_entity_id(&self) -> Result<Option<EntityId>, EntityIdError> {
        if !self.alias.is_empty() {
            return Ok(None);
        }
        EntityId::encode(self.shard_num, self.realm_num, self.account_num).map(Some)
    }

    pub fn from_entity_id(id: EntityId) -> Self {
        Self {
            shard_num: id.shard(),
            realm_num: id.realm(),
            account_num: id.num(),
            alias: Vec::new(),
        }
    }
}

impl ContractId {
    /// The numeric id; `None` when the contract is addressed by EVM address.
    pub fn to_entity_id(&self) -> Result<Option<EntityId>, EntityIdError> {
        if !self.evm_address.is_empty() {
            return Ok(None);
        }
        EntityId::encode(self.shard_num, self.realm_num, self.contract_num).map(Some)
    }

    pub fn from_entity_id(id: EntityId) -> Self {
        Self {
            shard_num: id.shard(),
            realm_num: id.realm(),
            contract_num: id.num(),
            evm_address: Vec::new(),
        }
    }
}

impl Timestamp {
    pub fn to_nanos(&self) -> ConsensusTimestamp {
        timestamp::from_seconds_nanos(self.seconds, self.nanos)
    }

    pub fn from_nanos(ts: ConsensusTimestamp) -> Self {
        let (seconds, nanos) = timestamp::to_seconds_nanos(ts);
        Self { seconds, nanos }
    }
}

impl Key {
    /// Raw key bytes, whichever variant is set.
    pub fn key_bytes(&self) -> &[u8] {
        if self.ed25519.is_empty() {
            &self.ecdsa_secp256k1
        } else {
            &self.ed25519
        }
    }
}
