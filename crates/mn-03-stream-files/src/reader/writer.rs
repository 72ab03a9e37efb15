//! Stream file writers.
//!
//! Produce byte-exact containers that the readers accept. Used to build
//! fixtures and by tooling that replays synthetic streams.

use super::balance_file::BALANCE_FILE_VERSION;
use super::record_file::{next_running_hash, RECORD_FILE_VERSION};
use crate::domain::record_item::transaction_from_body;
use crate::proto::{
    AccountId, AllAccountBalances, HashObject, RecordStreamFile, RecordStreamItem,
    SemanticVersion, SingleAccountBalances, Timestamp, TokenId, TokenUnitBalance,
    TransactionBody, TransactionRecord,
};
use prost::Message;
use shared_types::{ConsensusTimestamp, EntityId, Sha384Hash};

#[derive(Debug, Clone)]
pub struct RecordFileWriter {
    hapi_version: SemanticVersion,
    start_hash: Sha384Hash,
    end_hash_override: Option<Sha384Hash>,
    block_number: i64,
    items: Vec<RecordStreamItem>,
}

impl RecordFileWriter {
    /// Starts a file whose running hash begins at `start_hash`, normally the
    /// previous file's end running hash.
    pub fn new(start_hash: Sha384Hash) -> Self {
        Self {
            hapi_version: SemanticVersion {
                major: 0,
                minor: 47,
                patch: 0,
            },
            start_hash,
            end_hash_override: None,
            block_number: 0,
            items: Vec::new(),
        }
    }

    pub fn block_number(mut self, block_number: i64) -> Self {
        self.block_number = block_number;
        self
    }

    pub fn hapi_version(mut self, major: i32, minor: i32, patch: i32) -> Self {
        self.hapi_version = SemanticVersion {
            major,
            minor,
            patch,
        };
        self
    }

    pub fn item(self, body: &TransactionBody, record: &TransactionRecord) -> Self {
        let transaction = transaction_from_body(body);
        self.raw_item(transaction.encode_to_vec(), record.encode_to_vec())
    }

    pub fn raw_item(mut self, transaction: Vec<u8>, record: Vec<u8>) -> Self {
        self.items.push(RecordStreamItem {
            transaction,
            record,
        });
        self
    }

    /// Declares a specific end running hash instead of the computed one.
    pub fn end_running_hash_override(mut self, hash: Sha384Hash) -> Self {
        self.end_hash_override = Some(hash);
        self
    }

    pub fn end_running_hash(&self) -> Sha384Hash {
        self.items
            .iter()
            .fold(self.start_hash, |hash, item| next_running_hash(&hash, item))
    }

    pub fn build(self) -> Vec<u8> {
        let end = self
            .end_hash_override
            .unwrap_or_else(|| self.end_running_hash());
        let stream = RecordStreamFile {
            hapi_proto_version: Some(self.hapi_version),
            start_object_running_hash: Some(HashObject::sha384(self.start_hash.as_bytes())),
            record_stream_items: self.items,
            end_object_running_hash: Some(HashObject::sha384(end.as_bytes())),
            block_number: self.block_number,
        };
        with_version(RECORD_FILE_VERSION, &stream)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BalanceFileWriter {
    consensus_timestamp: ConsensusTimestamp,
    accounts: Vec<SingleAccountBalances>,
}

impl BalanceFileWriter {
    pub fn new(consensus_timestamp: ConsensusTimestamp) -> Self {
        Self {
            consensus_timestamp,
            accounts: Vec::new(),
        }
    }

    pub fn account(mut self, account: EntityId, balance: u64, tokens: &[(EntityId, u64)]) -> Self {
        self.accounts.push(SingleAccountBalances {
            account_id: Some(AccountId::from_entity_id(account)),
            hbar_balance: balance,
            token_unit_balances: tokens
                .iter()
                .map(|(token, balance)| TokenUnitBalance {
                    token_id: Some(TokenId::from_entity_id(*token)),
                    balance: *balance,
                })
                .collect(),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let balances = AllAccountBalances {
            consensus_timestamp: Some(Timestamp::from_nanos(self.consensus_timestamp)),
            all_accounts: self.accounts,
        };
        with_version(BALANCE_FILE_VERSION, &balances)
    }
}

fn with_version(version: u32, message: &impl Message) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4 + message.encoded_len());
    bytes.extend_from_slice(&version.to_be_bytes());
    bytes.extend(message.encode_to_vec());
    bytes
}
