//! # State Rows
//!
//! Rows describing current ledger state. Columns are [`Patch`] values so a
//! mutation only touches what the transaction actually set.

use crate::domain::row::{id_key, merge_columns, Row, Table};
use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, EntityId, Patch, TimestampRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Account,
    Contract,
    File,
    Topic,
    Token,
    Schedule,
}

// =============================================================================
// ENTITY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: Patch<EntityType>,
    pub created_timestamp: Patch<ConsensusTimestamp>,
    pub deleted: Patch<bool>,
    pub memo: Patch<String>,
    pub key: Patch<Vec<u8>>,
    pub alias: Patch<Vec<u8>>,
    pub evm_address: Patch<Vec<u8>>,
    pub expiration_timestamp: Patch<ConsensusTimestamp>,
    pub auto_renew_period: Patch<i64>,
    pub auto_renew_account_id: Patch<EntityId>,
    pub obtainer_id: Patch<EntityId>,
    pub permanent_removal: Patch<bool>,
    pub receiver_sig_required: Patch<bool>,
    pub max_automatic_token_associations: Patch<i32>,
    pub staked_account_id: Patch<EntityId>,
    pub staked_node_id: Patch<i64>,
    pub decline_reward: Patch<bool>,
    /// Topics only.
    pub submit_key: Patch<Vec<u8>>,
    pub timestamp_range: TimestampRange,
}

impl Entity {
    /// A mutation of `id` effective from `consensus_timestamp` touching no
    /// column.
    pub fn new(id: EntityId, consensus_timestamp: ConsensusTimestamp) -> Self {
        Self {
            id,
            entity_type: Patch::Unset,
            created_timestamp: Patch::Unset,
            deleted: Patch::Unset,
            memo: Patch::Unset,
            key: Patch::Unset,
            alias: Patch::Unset,
            evm_address: Patch::Unset,
            expiration_timestamp: Patch::Unset,
            auto_renew_period: Patch::Unset,
            auto_renew_account_id: Patch::Unset,
            obtainer_id: Patch::Unset,
            permanent_removal: Patch::Unset,
            receiver_sig_required: Patch::Unset,
            max_automatic_token_associations: Patch::Unset,
            staked_account_id: Patch::Unset,
            staked_node_id: Patch::Unset,
            decline_reward: Patch::Unset,
            submit_key: Patch::Unset,
            timestamp_range: TimestampRange::at_least(consensus_timestamp),
        }
    }
}

impl Row for Entity {
    const TABLE: Table = Table::Entity;

    fn key(&self) -> String {
        id_key(self.id)
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later;
            entity_type, created_timestamp, deleted, memo, key, alias, evm_address,
            expiration_timestamp, auto_renew_period, auto_renew_account_id, obtainer_id,
            permanent_removal, receiver_sig_required, max_automatic_token_associations,
            staked_account_id, staked_node_id, decline_reward, submit_key,
        );
    }
}

// =============================================================================
// TOKENS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

impl TokenType {
    pub fn from_code(code: i32) -> Self {
        if code == 1 {
            TokenType::NonFungibleUnique
        } else {
            TokenType::FungibleCommon
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_id: EntityId,
    pub name: Patch<String>,
    pub symbol: Patch<String>,
    pub decimals: Patch<u32>,
    pub token_type: Patch<TokenType>,
    pub total_supply: Patch<i64>,
    pub max_supply: Patch<i64>,
    pub treasury_account_id: Patch<EntityId>,
    pub freeze_default: Patch<bool>,
    pub paused: Patch<bool>,
    pub fee_schedule: Patch<Vec<u8>>,
    pub metadata: Patch<Vec<u8>>,
    pub created_timestamp: Patch<ConsensusTimestamp>,
    pub timestamp_range: TimestampRange,
}

impl Token {
    pub fn new(token_id: EntityId, consensus_timestamp: ConsensusTimestamp) -> Self {
        Self {
            token_id,
            name: Patch::Unset,
            symbol: Patch::Unset,
            decimals: Patch::Unset,
            token_type: Patch::Unset,
            total_supply: Patch::Unset,
            max_supply: Patch::Unset,
            treasury_account_id: Patch::Unset,
            freeze_default: Patch::Unset,
            paused: Patch::Unset,
            fee_schedule: Patch::Unset,
            metadata: Patch::Unset,
            created_timestamp: Patch::Unset,
            timestamp_range: TimestampRange::at_least(consensus_timestamp),
        }
    }
}

impl Row for Token {
    const TABLE: Table = Table::Token;

    fn key(&self) -> String {
        id_key(self.token_id)
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later;
            name, symbol, decimals, token_type, total_supply, max_supply, treasury_account_id,
            freeze_default, paused, fee_schedule, metadata, created_timestamp,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub account_id: EntityId,
    pub token_id: EntityId,
    pub associated: Patch<bool>,
    pub frozen: Patch<bool>,
    pub kyc_granted: Patch<bool>,
    pub created_timestamp: Patch<ConsensusTimestamp>,
    pub timestamp_range: TimestampRange,
}

impl TokenAccount {
    pub fn new(
        account_id: EntityId,
        token_id: EntityId,
        consensus_timestamp: ConsensusTimestamp,
    ) -> Self {
        Self {
            account_id,
            token_id,
            associated: Patch::Unset,
            frozen: Patch::Unset,
            kyc_granted: Patch::Unset,
            created_timestamp: Patch::Unset,
            timestamp_range: TimestampRange::at_least(consensus_timestamp),
        }
    }
}

impl Row for TokenAccount {
    const TABLE: Table = Table::TokenAccount;

    fn key(&self) -> String {
        format!("{}/{}", id_key(self.account_id), id_key(self.token_id))
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; associated, frozen, kyc_granted, created_timestamp);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    pub token_id: EntityId,
    pub serial_number: i64,
    pub account_id: Patch<EntityId>,
    pub spender: Patch<EntityId>,
    pub metadata: Patch<Vec<u8>>,
    pub deleted: Patch<bool>,
    pub created_timestamp: Patch<ConsensusTimestamp>,
    pub timestamp_range: TimestampRange,
}

impl Nft {
    pub fn new(token_id: EntityId, serial_number: i64, consensus_timestamp: ConsensusTimestamp) -> Self {
        Self {
            token_id,
            serial_number,
            account_id: Patch::Unset,
            spender: Patch::Unset,
            metadata: Patch::Unset,
            deleted: Patch::Unset,
            created_timestamp: Patch::Unset,
            timestamp_range: TimestampRange::at_least(consensus_timestamp),
        }
    }
}

impl Row for Nft {
    const TABLE: Table = Table::Nft;

    fn key(&self) -> String {
        format!("{}/{:019}", id_key(self.token_id), self.serial_number.max(0))
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; account_id, spender, metadata, deleted, created_timestamp);
    }
}

// =============================================================================
// AIRDROPS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirdropState {
    Pending,
    Cancelled,
    Claimed,
}

/// Keyed by sender, receiver, token and serial (zero for fungible tokens).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAirdrop {
    pub sender_account_id: EntityId,
    pub receiver_account_id: EntityId,
    pub token_id: EntityId,
    pub serial_number: i64,
    pub state: AirdropState,
    pub amount: Patch<i64>,
    pub timestamp_range: TimestampRange,
}

impl Row for TokenAirdrop {
    const TABLE: Table = Table::TokenAirdrop;

    fn key(&self) -> String {
        format!(
            "{}/{}/{}/{:019}",
            id_key(self.sender_account_id),
            id_key(self.receiver_account_id),
            id_key(self.token_id),
            self.serial_number.max(0)
        )
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        match (self.state, later.state) {
            (AirdropState::Pending, AirdropState::Pending) => {
                self.amount = match (self.amount, later.amount) {
                    (Patch::Set(a), Patch::Set(b)) => Patch::Set(a.saturating_add(b)),
                    (current, incoming) => current.then(incoming),
                };
            }
            (AirdropState::Pending, _) => self.state = later.state,
            (_, _) => {
                self.state = later.state;
                self.amount = later.amount;
            }
        }
    }

    /// Cancel and claim only close a pending airdrop.
    fn accepts(&self, later: &Self) -> bool {
        later.state == AirdropState::Pending || self.state == AirdropState::Pending
    }

    fn accepts_new(&self) -> bool {
        self.state == AirdropState::Pending
    }
}

// =============================================================================
// ALLOWANCES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoAllowance {
    pub owner: EntityId,
    pub spender: EntityId,
    pub amount: Patch<i64>,
    pub payer_account_id: Patch<EntityId>,
    pub timestamp_range: TimestampRange,
}

impl Row for CryptoAllowance {
    const TABLE: Table = Table::CryptoAllowance;

    fn key(&self) -> String {
        format!("{}/{}", id_key(self.owner), id_key(self.spender))
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; amount, payer_account_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAllowance {
    pub owner: EntityId,
    pub spender: EntityId,
    pub token_id: EntityId,
    pub amount: Patch<i64>,
    pub payer_account_id: Patch<EntityId>,
    pub timestamp_range: TimestampRange,
}

impl Row for TokenAllowance {
    const TABLE: Table = Table::TokenAllowance;

    fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            id_key(self.owner),
            id_key(self.spender),
            id_key(self.token_id)
        )
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; amount, payer_account_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftAllowance {
    pub owner: EntityId,
    pub spender: EntityId,
    pub token_id: EntityId,
    pub approved_for_all: Patch<bool>,
    pub payer_account_id: Patch<EntityId>,
    pub timestamp_range: TimestampRange,
}

impl Row for NftAllowance {
    const TABLE: Table = Table::NftAllowance;

    fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            id_key(self.owner),
            id_key(self.spender),
            id_key(self.token_id)
        )
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; approved_for_all, payer_account_id);
    }
}

// =============================================================================
// NODES AND SCHEDULES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: i64,
    pub account_id: Patch<EntityId>,
    pub description: Patch<String>,
    pub admin_key: Patch<Vec<u8>>,
    pub created_timestamp: Patch<ConsensusTimestamp>,
    pub deleted: Patch<bool>,
    pub timestamp_range: TimestampRange,
}

impl Node {
    pub fn new(node_id: i64, consensus_timestamp: ConsensusTimestamp) -> Self {
        Self {
            node_id,
            account_id: Patch::Unset,
            description: Patch::Unset,
            admin_key: Patch::Unset,
            created_timestamp: Patch::Unset,
            deleted: Patch::Unset,
            timestamp_range: TimestampRange::at_least(consensus_timestamp),
        }
    }
}

impl Row for Node {
    const TABLE: Table = Table::Node;

    fn key(&self) -> String {
        format!("{:019}", self.node_id.max(0))
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn set_timestamp_range(&mut self, range: TimestampRange) {
        self.timestamp_range = range;
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later; account_id, description, admin_key, created_timestamp, deleted);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: EntityId,
    pub consensus_timestamp: Patch<ConsensusTimestamp>,
    pub creator_account_id: Patch<EntityId>,
    pub payer_account_id: Patch<EntityId>,
    pub transaction_body: Patch<Vec<u8>>,
    pub expiration_time: Patch<ConsensusTimestamp>,
    pub wait_for_expiry: Patch<bool>,
    pub executed_timestamp: Patch<ConsensusTimestamp>,
}

impl Schedule {
    pub fn new(schedule_id: EntityId) -> Self {
        Self {
            schedule_id,
            consensus_timestamp: Patch::Unset,
            creator_account_id: Patch::Unset,
            payer_account_id: Patch::Unset,
            transaction_body: Patch::Unset,
            expiration_time: Patch::Unset,
            wait_for_expiry: Patch::Unset,
            executed_timestamp: Patch::Unset,
        }
    }
}

impl Row for Schedule {
    const TABLE: Table = Table::Schedule;

    fn key(&self) -> String {
        id_key(self.schedule_id)
    }

    fn merge(&mut self, later: &Self) {
        merge_columns!(self, later;
            consensus_timestamp, creator_account_id, payer_account_id, transaction_body,
            expiration_time, wait_for_expiry, executed_timestamp,
        );
    }
}
