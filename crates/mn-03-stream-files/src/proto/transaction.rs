//! Signed transactions and their bodies.
//!
//! The `data` oneof tags equal the transaction type codes so a body's tag
//! identifies its [`TransactionType`](crate::TransactionType).

use super::basic::*;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(message, optional, tag = "3")]
    pub sig_map: Option<SignatureMap>,
    /// Serialized [`TransactionBody`] (legacy layout).
    #[prost(bytes = "vec", tag = "4")]
    pub body_bytes: Vec<u8>,
    /// Serialized [`SignedTransaction`].
    #[prost(bytes = "vec", tag = "5")]
    pub signed_transaction_bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedTransaction {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub sig_map: Option<SignatureMap>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureMap {
    #[prost(message, repeated, tag = "1")]
    pub sig_pair: Vec<SignaturePair>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignaturePair {
    #[prost(bytes = "vec", tag = "1")]
    pub pub_key_prefix: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub ed25519: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub ecdsa_secp256k1: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionBody {
    #[prost(message, optional, tag = "1")]
    pub transaction_id: Option<TransactionId>,
    #[prost(message, optional, tag = "2")]
    pub node_account_id: Option<AccountId>,
    #[prost(uint64, tag = "3")]
    pub transaction_fee: u64,
    #[prost(message, optional, tag = "4")]
    pub transaction_valid_duration: Option<Duration>,
    #[prost(string, tag = "6")]
    pub memo: String,
    #[prost(
        oneof = "transaction_body::Data",
        tags = "7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60"
    )]
    pub data: Option<transaction_body::Data>,
}

pub mod transaction_body {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "7")]
        ContractCall(ContractCallBody),
        #[prost(message, tag = "8")]
        ContractCreateInstance(ContractCreateBody),
        #[prost(message, tag = "9")]
        ContractUpdateInstance(ContractUpdateBody),
        #[prost(message, tag = "10")]
        CryptoAddLiveHash(LiveHashBody),
        #[prost(message, tag = "11")]
        CryptoCreateAccount(CryptoCreateBody),
        #[prost(message, tag = "12")]
        CryptoDelete(CryptoDeleteBody),
        #[prost(message, tag = "13")]
        CryptoDeleteLiveHash(LiveHashBody),
        #[prost(message, tag = "14")]
        CryptoTransfer(CryptoTransferBody),
        #[prost(message, tag = "15")]
        CryptoUpdateAccount(CryptoUpdateBody),
        #[prost(message, tag = "16")]
        FileAppend(FileAppendBody),
        #[prost(message, tag = "17")]
        FileCreate(FileCreateBody),
        #[prost(message, tag = "18")]
        FileDelete(FileDeleteBody),
        #[prost(message, tag = "19")]
        FileUpdate(FileUpdateBody),
        #[prost(message, tag = "20")]
        SystemDelete(SystemDeleteBody),
        #[prost(message, tag = "21")]
        SystemUndelete(SystemUndeleteBody),
        #[prost(message, tag = "22")]
        ContractDeleteInstance(ContractDeleteBody),
        #[prost(message, tag = "23")]
        Freeze(FreezeBody),
        #[prost(message, tag = "24")]
        ConsensusCreateTopic(ConsensusCreateTopicBody),
        #[prost(message, tag = "25")]
        ConsensusUpdateTopic(ConsensusUpdateTopicBody),
        #[prost(message, tag = "26")]
        ConsensusDeleteTopic(TopicIdBody),
        #[prost(message, tag = "27")]
        ConsensusSubmitMessage(ConsensusSubmitMessageBody),
        #[prost(message, tag = "28")]
        UncheckedSubmit(UncheckedSubmitBody),
        #[prost(message, tag = "29")]
        TokenCreation(TokenCreateBody),
        #[prost(message, tag = "31")]
        TokenFreeze(TokenAccountBody),
        #[prost(message, tag = "32")]
        TokenUnfreeze(TokenAccountBody),
        #[prost(message, tag = "33")]
        TokenGrantKyc(TokenAccountBody),
        #[prost(message, tag = "34")]
        TokenRevokeKyc(TokenAccountBody),
        #[prost(message, tag = "35")]
        TokenDeletion(TokenIdBody),
        #[prost(message, tag = "36")]
        TokenUpdate(TokenUpdateBody),
        #[prost(message, tag = "37")]
        TokenMint(TokenMintBody),
        #[prost(message, tag = "38")]
        TokenBurn(TokenBurnBody),
        #[prost(message, tag = "39")]
        TokenWipe(TokenWipeBody),
        #[prost(message, tag = "40")]
        TokenAssociate(TokenAssociationBody),
        #[prost(message, tag = "41")]
        TokenDissociate(TokenAssociationBody),
        #[prost(message, tag = "42")]
        ScheduleCreate(ScheduleCreateBody),
        #[prost(message, tag = "43")]
        ScheduleDelete(ScheduleIdBody),
        #[prost(message, tag = "44")]
        ScheduleSign(ScheduleIdBody),
        #[prost(message, tag = "45")]
        TokenFeeScheduleUpdate(TokenFeeScheduleUpdateBody),
        #[prost(message, tag = "46")]
        TokenPause(TokenIdBody),
        #[prost(message, tag = "47")]
        TokenUnpause(TokenIdBody),
        #[prost(message, tag = "48")]
        CryptoApproveAllowance(CryptoApproveAllowanceBody),
        #[prost(message, tag = "49")]
        CryptoDeleteAllowance(CryptoDeleteAllowanceBody),
        #[prost(message, tag = "50")]
        EthereumTransaction(EthereumTransactionBody),
        #[prost(message, tag = "51")]
        NodeStakeUpdate(NodeStakeUpdateBody),
        #[prost(message, tag = "52")]
        UtilPrng(UtilPrngBody),
        #[prost(message, tag = "53")]
        TokenUpdateNfts(TokenUpdateNftsBody),
        #[prost(message, tag = "54")]
        NodeCreate(NodeCreateBody),
        #[prost(message, tag = "55")]
        NodeUpdate(NodeUpdateBody),
        #[prost(message, tag = "56")]
        NodeDelete(NodeDeleteBody),
        #[prost(message, tag = "57")]
        TokenReject(TokenRejectBody),
        #[prost(message, tag = "58")]
        TokenAirdrop(TokenAirdropBody),
        #[prost(message, tag = "59")]
        TokenCancelAirdrop(PendingAirdropsBody),
        #[prost(message, tag = "60")]
        TokenClaimAirdrop(PendingAirdropsBody),
    }
}

// =============================================================================
// CONTRACT
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractCallBody {
    #[prost(message, optional, tag = "1")]
    pub contract_id: Option<ContractId>,
    #[prost(int64, tag = "2")]
    pub gas: i64,
    #[prost(int64, tag = "3")]
    pub amount: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub function_parameters: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractCreateBody {
    #[prost(message, optional, tag = "1")]
    pub file_id: Option<FileId>,
    #[prost(bytes = "vec", tag = "2")]
    pub initcode: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub admin_key: Option<Key>,
    #[prost(int64, tag = "4")]
    pub gas: i64,
    #[prost(int64, tag = "5")]
    pub initial_balance: i64,
    #[prost(message, optional, tag = "8")]
    pub auto_renew_period: Option<Duration>,
    #[prost(string, tag = "9")]
    pub memo: String,
    #[prost(int32, tag = "10")]
    pub max_automatic_token_associations: i32,
    #[prost(message, optional, tag = "11")]
    pub auto_renew_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "12")]
    pub staked_account_id: Option<AccountId>,
    #[prost(int64, optional, tag = "13")]
    pub staked_node_id: Option<i64>,
    #[prost(bool, tag = "14")]
    pub decline_reward: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractUpdateBody {
    #[prost(message, optional, tag = "1")]
    pub contract_id: Option<ContractId>,
    #[prost(message, optional, tag = "2")]
    pub expiration_time: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "6")]
    pub auto_renew_period: Option<Duration>,
    #[prost(string, optional, tag = "9")]
    pub memo: Option<String>,
    #[prost(int32, optional, tag = "13")]
    pub max_automatic_token_associations: Option<i32>,
    #[prost(message, optional, tag = "14")]
    pub auto_renew_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "15")]
    pub staked_account_id: Option<AccountId>,
    #[prost(int64, optional, tag = "16")]
    pub staked_node_id: Option<i64>,
    #[prost(bool, optional, tag = "17")]
    pub decline_reward: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ContractDeleteBody {
    #[prost(message, optional, tag = "1")]
    pub contract_id: Option<ContractId>,
    #[prost(message, optional, tag = "2")]
    pub transfer_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub transfer_contract_id: Option<ContractId>,
    #[prost(bool, tag = "4")]
    pub permanent_removal: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EthereumTransactionBody {
    #[prost(bytes = "vec", tag = "1")]
    pub ethereum_data: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub call_data: Option<FileId>,
    #[prost(int64, tag = "3")]
    pub max_gas_allowance: i64,
}

// =============================================================================
// CRYPTO
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LiveHashBody {
    #[prost(message, optional, tag = "1")]
    pub account_id: Option<AccountId>,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoCreateBody {
    #[prost(message, optional, tag = "1")]
    pub key: Option<Key>,
    #[prost(uint64, tag = "2")]
    pub initial_balance: u64,
    #[prost(bool, tag = "7")]
    pub receiver_sig_required: bool,
    #[prost(message, optional, tag = "8")]
    pub auto_renew_period: Option<Duration>,
    #[prost(string, tag = "13")]
    pub memo: String,
    #[prost(int32, tag = "14")]
    pub max_automatic_token_associations: i32,
    #[prost(message, optional, tag = "15")]
    pub staked_account_id: Option<AccountId>,
    #[prost(int64, optional, tag = "16")]
    pub staked_node_id: Option<i64>,
    #[prost(bool, tag = "17")]
    pub decline_reward: bool,
    #[prost(bytes = "vec", tag = "18")]
    pub alias: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoDeleteBody {
    /// Account receiving the remaining balance.
    #[prost(message, optional, tag = "1")]
    pub transfer_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "2")]
    pub delete_account_id: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoTransferBody {
    #[prost(message, optional, tag = "1")]
    pub transfers: Option<TransferList>,
    #[prost(message, repeated, tag = "2")]
    pub token_transfers: Vec<TokenTransferList>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoUpdateBody {
    #[prost(message, optional, tag = "2")]
    pub account_id_to_update: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub key: Option<Key>,
    #[prost(message, optional, tag = "5")]
    pub expiration_time: Option<Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub auto_renew_period: Option<Duration>,
    #[prost(string, optional, tag = "14")]
    pub memo: Option<String>,
    #[prost(int32, optional, tag = "15")]
    pub max_automatic_token_associations: Option<i32>,
    #[prost(bool, optional, tag = "16")]
    pub receiver_sig_required: Option<bool>,
    #[prost(message, optional, tag = "17")]
    pub staked_account_id: Option<AccountId>,
    #[prost(int64, optional, tag = "18")]
    pub staked_node_id: Option<i64>,
    #[prost(bool, optional, tag = "19")]
    pub decline_reward: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoAllowance {
    #[prost(message, optional, tag = "1")]
    pub owner: Option<AccountId>,
    #[prost(message, optional, tag = "2")]
    pub spender: Option<AccountId>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NftAllowance {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub owner: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub spender: Option<AccountId>,
    #[prost(int64, repeated, tag = "4")]
    pub serial_numbers: Vec<i64>,
    #[prost(bool, optional, tag = "5")]
    pub approved_for_all: Option<bool>,
    #[prost(message, optional, tag = "6")]
    pub delegating_spender: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenAllowance {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub owner: Option<AccountId>,
    #[prost(message, optional, tag = "3")]
    pub spender: Option<AccountId>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoApproveAllowanceBody {
    #[prost(message, repeated, tag = "1")]
    pub crypto_allowances: Vec<CryptoAllowance>,
    #[prost(message, repeated, tag = "2")]
    pub nft_allowances: Vec<NftAllowance>,
    #[prost(message, repeated, tag = "3")]
    pub token_allowances: Vec<TokenAllowance>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NftRemoveAllowance {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub owner: Option<AccountId>,
    #[prost(int64, repeated, tag = "3")]
    pub serial_numbers: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CryptoDeleteAllowanceBody {
    #[prost(message, repeated, tag = "2")]
    pub nft_allowances: Vec<NftRemoveAllowance>,
}

// =============================================================================
// FILE / SYSTEM
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileAppendBody {
    #[prost(message, optional, tag = "2")]
    pub file_id: Option<FileId>,
    #[prost(bytes = "vec", tag = "4")]
    pub contents: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileCreateBody {
    #[prost(message, optional, tag = "2")]
    pub expiration_time: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub keys: Option<Key>,
    #[prost(bytes = "vec", tag = "4")]
    pub contents: Vec<u8>,
    #[prost(string, tag = "8")]
    pub memo: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDeleteBody {
    #[prost(message, optional, tag = "2")]
    pub file_id: Option<FileId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileUpdateBody {
    #[prost(message, optional, tag = "1")]
    pub file_id: Option<FileId>,
    #[prost(message, optional, tag = "2")]
    pub expiration_time: Option<Timestamp>,
    #[prost(message, optional, tag = "3")]
    pub keys: Option<Key>,
    #[prost(bytes = "vec", tag = "4")]
    pub contents: Vec<u8>,
    #[prost(string, optional, tag = "5")]
    pub memo: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SystemDeleteBody {
    #[prost(message, optional, tag = "1")]
    pub file_id: Option<FileId>,
    #[prost(message, optional, tag = "2")]
    pub contract_id: Option<ContractId>,
    #[prost(message, optional, tag = "3")]
    pub expiration_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SystemUndeleteBody {
    #[prost(message, optional, tag = "1")]
    pub file_id: Option<FileId>,
    #[prost(message, optional, tag = "2")]
    pub contract_id: Option<ContractId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FreezeBody {
    #[prost(message, optional, tag = "3")]
    pub start_time: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub update_file: Option<FileId>,
    #[prost(bytes = "vec", tag = "6")]
    pub file_hash: Vec<u8>,
    #[prost(int32, tag = "7")]
    pub freeze_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UncheckedSubmitBody {
    #[prost(bytes = "vec", tag = "1")]
    pub transaction_bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UtilPrngBody {
    #[prost(int32, tag = "1")]
    pub range: i32,
}

// =============================================================================
// CONSENSUS
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusCreateTopicBody {
    #[prost(string, tag = "1")]
    pub memo: String,
    #[prost(message, optional, tag = "2")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "3")]
    pub submit_key: Option<Key>,
    #[prost(message, optional, tag = "6")]
    pub auto_renew_period: Option<Duration>,
    #[prost(message, optional, tag = "7")]
    pub auto_renew_account: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusUpdateTopicBody {
    #[prost(message, optional, tag = "1")]
    pub topic_id: Option<TopicId>,
    #[prost(string, optional, tag = "2")]
    pub memo: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub expiration_time: Option<Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "7")]
    pub submit_key: Option<Key>,
    #[prost(message, optional, tag = "8")]
    pub auto_renew_period: Option<Duration>,
    #[prost(message, optional, tag = "9")]
    pub auto_renew_account: Option<AccountId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TopicIdBody {
    #[prost(message, optional, tag = "1")]
    pub topic_id: Option<TopicId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusMessageChunkInfo {
    #[prost(message, optional, tag = "1")]
    pub initial_transaction_id: Option<TransactionId>,
    #[prost(int32, tag = "2")]
    pub total: i32,
    #[prost(int32, tag = "3")]
    pub number: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsensusSubmitMessageBody {
    #[prost(message, optional, tag = "1")]
    pub topic_id: Option<TopicId>,
    #[prost(bytes = "vec", tag = "2")]
    pub message: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub chunk_info: Option<ConsensusMessageChunkInfo>,
}

// =============================================================================
// TOKEN
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenCreateBody {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub symbol: String,
    #[prost(uint32, tag = "3")]
    pub decimals: u32,
    #[prost(uint64, tag = "4")]
    pub initial_supply: u64,
    #[prost(message, optional, tag = "5")]
    pub treasury: Option<AccountId>,
    #[prost(message, optional, tag = "6")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "7")]
    pub kyc_key: Option<Key>,
    #[prost(message, optional, tag = "8")]
    pub freeze_key: Option<Key>,
    #[prost(message, optional, tag = "9")]
    pub wipe_key: Option<Key>,
    #[prost(message, optional, tag = "10")]
    pub supply_key: Option<Key>,
    #[prost(bool, tag = "11")]
    pub freeze_default: bool,
    #[prost(message, optional, tag = "13")]
    pub expiry: Option<Timestamp>,
    #[prost(message, optional, tag = "14")]
    pub auto_renew_account: Option<AccountId>,
    #[prost(message, optional, tag = "15")]
    pub auto_renew_period: Option<Duration>,
    #[prost(string, tag = "16")]
    pub memo: String,
    /// 0 = fungible common, 1 = non-fungible unique.
    #[prost(int32, tag = "17")]
    pub token_type: i32,
    /// 0 = infinite, 1 = finite.
    #[prost(int32, tag = "18")]
    pub supply_type: i32,
    #[prost(int64, tag = "19")]
    pub max_supply: i64,
    #[prost(message, optional, tag = "20")]
    pub fee_schedule_key: Option<Key>,
    #[prost(message, optional, tag = "22")]
    pub pause_key: Option<Key>,
    #[prost(bytes = "vec", tag = "23")]
    pub metadata: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenUpdateBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(string, tag = "2")]
    pub symbol: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(message, optional, tag = "4")]
    pub treasury: Option<AccountId>,
    #[prost(message, optional, tag = "5")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "6")]
    pub kyc_key: Option<Key>,
    #[prost(message, optional, tag = "7")]
    pub freeze_key: Option<Key>,
    #[prost(message, optional, tag = "8")]
    pub wipe_key: Option<Key>,
    #[prost(message, optional, tag = "9")]
    pub supply_key: Option<Key>,
    #[prost(message, optional, tag = "10")]
    pub auto_renew_account: Option<AccountId>,
    #[prost(message, optional, tag = "11")]
    pub auto_renew_period: Option<Duration>,
    #[prost(message, optional, tag = "12")]
    pub expiry: Option<Timestamp>,
    #[prost(string, optional, tag = "13")]
    pub memo: Option<String>,
    #[prost(message, optional, tag = "14")]
    pub fee_schedule_key: Option<Key>,
    #[prost(message, optional, tag = "15")]
    pub pause_key: Option<Key>,
    #[prost(bytes = "vec", optional, tag = "16")]
    pub metadata: Option<Vec<u8>>,
}

/// Freeze, unfreeze, KYC grant and KYC revoke.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenAccountBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub account: Option<AccountId>,
}

/// Delete, pause and unpause.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenIdBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenMintBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(uint64, tag = "2")]
    pub amount: u64,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub metadata: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenBurnBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(uint64, tag = "2")]
    pub amount: u64,
    #[prost(int64, repeated, tag = "3")]
    pub serial_numbers: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenWipeBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub account: Option<AccountId>,
    #[prost(uint64, tag = "3")]
    pub amount: u64,
    #[prost(int64, repeated, tag = "4")]
    pub serial_numbers: Vec<i64>,
}

/// Associate and dissociate.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenAssociationBody {
    #[prost(message, optional, tag = "1")]
    pub account: Option<AccountId>,
    #[prost(message, repeated, tag = "2")]
    pub tokens: Vec<TokenId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenFeeScheduleUpdateBody {
    #[prost(message, optional, tag = "1")]
    pub token_id: Option<TokenId>,
    /// Serialized custom fees, stored as-is.
    #[prost(bytes = "vec", tag = "2")]
    pub custom_fees: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenUpdateNftsBody {
    #[prost(message, optional, tag = "1")]
    pub token: Option<TokenId>,
    #[prost(int64, repeated, tag = "2")]
    pub serial_numbers: Vec<i64>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub metadata: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenAirdropBody {
    #[prost(message, repeated, tag = "1")]
    pub token_transfers: Vec<TokenTransferList>,
}

/// Cancel and claim airdrop.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PendingAirdropsBody {
    #[prost(message, repeated, tag = "1")]
    pub pending_airdrops: Vec<PendingAirdropId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenReference {
    #[prost(message, optional, tag = "1")]
    pub fungible_token: Option<TokenId>,
    #[prost(message, optional, tag = "2")]
    pub nft: Option<NftId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenRejectBody {
    #[prost(message, optional, tag = "1")]
    pub owner: Option<AccountId>,
    #[prost(message, repeated, tag = "2")]
    pub rejections: Vec<TokenReference>,
}

// =============================================================================
// SCHEDULE
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScheduleCreateBody {
    /// Serialized inner transaction body.
    #[prost(bytes = "vec", tag = "1")]
    pub scheduled_transaction_body: Vec<u8>,
    #[prost(string, tag = "2")]
    pub memo: String,
    #[prost(message, optional, tag = "3")]
    pub admin_key: Option<Key>,
    #[prost(message, optional, tag = "4")]
    pub payer_account_id: Option<AccountId>,
    #[prost(message, optional, tag = "5")]
    pub expiration_time: Option<Timestamp>,
    #[prost(bool, tag = "13")]
    pub wait_for_expiry: bool,
}

/// Sign and delete.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScheduleIdBody {
    #[prost(message, optional, tag = "1")]
    pub schedule_id: Option<ScheduleId>,
}

// =============================================================================
// NODE
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeStake {
    #[prost(int64, tag = "1")]
    pub node_id: i64,
    #[prost(int64, tag = "2")]
    pub stake: i64,
    #[prost(int64, tag = "3")]
    pub reward_rate: i64,
    #[prost(int64, tag = "4")]
    pub stake_rewarded: i64,
    #[prost(int64, tag = "5")]
    pub stake_not_rewarded: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeStakeUpdateBody {
    #[prost(message, optional, tag = "1")]
    pub end_of_staking_period: Option<Timestamp>,
    #[prost(message, repeated, tag = "2")]
    pub node_stake: Vec<NodeStake>,
    /// Staking period length in minutes.
    #[prost(int64, tag = "3")]
    pub staking_period: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeCreateBody {
    #[prost(message, optional, tag = "1")]
    pub account_id: Option<AccountId>,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(message, repeated, tag = "3")]
    pub gossip_endpoint: Vec<ServiceEndpoint>,
    #[prost(message, repeated, tag = "4")]
    pub service_endpoint: Vec<ServiceEndpoint>,
    #[prost(bytes = "vec", tag = "5")]
    pub gossip_ca_certificate: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub grpc_certificate_hash: Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub admin_key: Option<Key>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeUpdateBody {
    #[prost(uint64, tag = "1")]
    pub node_id: u64,
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub gossip_endpoint: Vec<ServiceEndpoint>,
    #[prost(message, repeated, tag = "5")]
    pub service_endpoint: Vec<ServiceEndpoint>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub gossip_ca_certificate: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub grpc_certificate_hash: Option<Vec<u8>>,
    #[prost(message, optional, tag = "8")]
    pub admin_key: Option<Key>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeDeleteBody {
    #[prost(uint64, tag = "1")]
    pub node_id: u64,
}
