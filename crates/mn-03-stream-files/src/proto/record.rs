//! Transaction records: what a transaction did once it reached consensus.

use super::basic::*;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionReceipt {
    /// [`ResponseCode`](crate::ResponseCode) value.
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub file_id: Option<FileId>,
    #[prost(message, optional, tag = "4")]
    pub contract_id: Option<ContractId>,
    #[prost(message, optional, tag = "6")]
    pub topic_id: Option<TopicId>,
    #[prost(uint64, tag = "7")]
    pub topic_sequence_number: u64,
    #[prost(bytes = "vec", tag = "8")]
    pub topic_running_hash: Vec<u8>,
    #[prost(uint64, tag = "9")]
    pub topic_running_hash_version: u64,
    #[prost(message, optional, tag = "10")]
    pub token_id: Option<TokenId>,
    #[prost(uint64, tag = "11")]
    pub new_total_supply: u64,
    #[prost(message, optional, tag = "12")]
    pub schedule_id: Option<ScheduleId>,
    #[prost(message, optional, tag = "13")]
    pub scheduled_transaction_id: Option<TransactionId>,
    #[prost(int64, repeated, tag = "14")]
    pub serial_numbers: Vec<i64>,
    #[prost(uint64, tag = "15")]
    pub node_id: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractFunctionResult {
    #[prost(message, optional, tag = "1")]
    pub contract_id: Option<ContractId>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_call_result: Vec<u8>,
    #[prost(string, tag = "3")]
    pub error_message: String,
    #[prost(bytes = "vec", tag = "4")]
    pub bloom: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub gas_used: u64,
    #[prost(message, repeated, tag = "7")]
    pub created_contract_ids: Vec<ContractId>,
    #[prost(bytes = "vec", tag = "9")]
    pub evm_address: Vec<u8>,
    #[prost(int64, tag = "10")]
    pub gas: i64,
    #[prost(int64, tag = "11")]
    pub amount: i64,
    #[prost(bytes = "vec", tag = "12")]
    pub function_parameters: Vec<u8>,
    #[prost(message, optional, tag = "13")]
    pub sender_id: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenAssociation {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PendingAirdropValue {
    #[prost(uint64, tag = "1")]
    pub amount: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PendingAirdropRecord {
    #[prost(message, optional, tag = "1")]
    pub pending_airdrop_id: Option<PendingAirdropId>,
    /// Absent for NFT airdrops.
    #[prost(message, optional, tag = "2")]
    pub pending_airdrop_value: Option<PendingAirdropValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRecord {
    #[prost(message, optional, tag = "1")]
    pub receipt: Option<TransactionReceipt>,
    #[prost(bytes = "vec", tag = "2")]
    pub transaction_hash: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub consensus_timestamp: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    pub transaction_id: Option<TransactionId>,
    #[prost(string, tag = "5")]
    pub memo: String,
    #[prost(uint64, tag = "6")]
    pub transaction_fee: u64,
    #[prost(message, optional, tag = "7")]
    pub contract_call_result: Option<ContractFunctionResult>,
    #[prost(message, optional, tag = "8")]
    pub contract_create_result: Option<ContractFunctionResult>,
    #[prost(message, optional, tag = "10")]
    pub transfer_list: Option<TransferList>,
    #[prost(message, repeated, tag = "11")]
    pub token_transfer_lists: Vec<TokenTransferList>,
    #[prost(message, optional, tag = "12")]
    pub schedule_ref: Option<ScheduleId>,
    #[prost(message, repeated, tag = "14")]
    pub automatic_token_associations: Vec<TokenAssociation>,
    #[prost(message, optional, tag = "15")]
    pub parent_consensus_timestamp: Option<Timestamp>,
    #[prost(bytes = "vec", tag = "16")]
    pub alias: Vec<u8>,
    #[prost(bytes = "vec", tag = "17")]
    pub ethereum_hash: Vec<u8>,
    #[prost(message, repeated, tag = "18")]
    pub paid_staking_rewards: Vec<AccountAmount>,
    #[prost(bytes = "vec", tag = "19")]
    pub prng_bytes: Vec<u8>,
    #[prost(int32, tag = "20")]
    pub prng_number: i32,
    #[prost(bytes = "vec", tag = "21")]
    pub evm_address: Vec<u8>,
    #[prost(message, repeated, tag = "22")]
    pub new_pending_airdrops: Vec<PendingAirdropRecord>,
}

impl TransactionRecord {
    /// Call or create result, whichever is present.
    pub fn contract_result(&self) -> Option<&ContractFunctionResult> {
        self.contract_call_result
            .as_ref()
            .or(self.contract_create_result.as_ref())
    }
}
