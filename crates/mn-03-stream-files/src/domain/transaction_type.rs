//! # Transaction Types
//!
//! Closed set of ledger transaction kinds. Codes match the body tags of
//! [`TransactionBody`](crate::proto::TransactionBody).

use crate::proto::transaction_body::Data;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! transaction_types {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// Every ledger transaction kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum TransactionType {
            $($variant,)*
            /// Body missing or of a kind this importer does not know.
            Unknown,
        }

        impl TransactionType {
            /// All kinds, `Unknown` last.
            pub const ALL: &'static [TransactionType] = &[
                $(TransactionType::$variant,)*
                TransactionType::Unknown,
            ];

            pub fn code(&self) -> i32 {
                match self {
                    $(TransactionType::$variant => $code,)*
                    TransactionType::Unknown => -1,
                }
            }

            pub fn from_code(code: i32) -> Self {
                match code {
                    $($code => TransactionType::$variant,)*
                    _ => TransactionType::Unknown,
                }
            }

            /// Upper-case name used in logs, metrics and persisted rows.
            pub fn name(&self) -> &'static str {
                match self {
                    $(TransactionType::$variant => $name,)*
                    TransactionType::Unknown => "UNKNOWN",
                }
            }
        }
    };
}

transaction_types! {
    ContractCall = 7 => "CONTRACTCALL",
    ContractCreateInstance = 8 => "CONTRACTCREATEINSTANCE",
    ContractUpdateInstance = 9 => "CONTRACTUPDATEINSTANCE",
    CryptoAddLiveHash = 10 => "CRYPTOADDLIVEHASH",
    CryptoCreateAccount = 11 => "CRYPTOCREATEACCOUNT",
    CryptoDelete = 12 => "CRYPTODELETE",
    CryptoDeleteLiveHash = 13 => "CRYPTODELETELIVEHASH",
    CryptoTransfer = 14 => "CRYPTOTRANSFER",
    CryptoUpdateAccount = 15 => "CRYPTOUPDATEACCOUNT",
    FileAppend = 16 => "FILEAPPEND",
    FileCreate = 17 => "FILECREATE",
    FileDelete = 18 => "FILEDELETE",
    FileUpdate = 19 => "FILEUPDATE",
    SystemDelete = 20 => "SYSTEMDELETE",
    SystemUndelete = 21 => "SYSTEMUNDELETE",
    ContractDeleteInstance = 22 => "CONTRACTDELETEINSTANCE",
    Freeze = 23 => "FREEZE",
    ConsensusCreateTopic = 24 => "CONSENSUSCREATETOPIC",
    ConsensusUpdateTopic = 25 => "CONSENSUSUPDATETOPIC",
    ConsensusDeleteTopic = 26 => "CONSENSUSDELETETOPIC",
    ConsensusSubmitMessage = 27 => "CONSENSUSSUBMITMESSAGE",
    UncheckedSubmit = 28 => "UNCHECKEDSUBMIT",
    TokenCreation = 29 => "TOKENCREATION",
    TokenFreeze = 31 => "TOKENFREEZE",
    TokenUnfreeze = 32 => "TOKENUNFREEZE",
    TokenGrantKyc = 33 => "TOKENGRANTKYC",
    TokenRevokeKyc = 34 => "TOKENREVOKEKYC",
    TokenDeletion = 35 => "TOKENDELETION",
    TokenUpdate = 36 => "TOKENUPDATE",
    TokenMint = 37 => "TOKENMINT",
    TokenBurn = 38 => "TOKENBURN",
    TokenWipe = 39 => "TOKENWIPE",
    TokenAssociate = 40 => "TOKENASSOCIATE",
    TokenDissociate = 41 => "TOKENDISSOCIATE",
    ScheduleCreate = 42 => "SCHEDULECREATE",
    ScheduleDelete = 43 => "SCHEDULEDELETE",
    ScheduleSign = 44 => "SCHEDULESIGN",
    TokenFeeScheduleUpdate = 45 => "TOKENFEESCHEDULEUPDATE",
    TokenPause = 46 => "TOKENPAUSE",
    TokenUnpause = 47 => "TOKENUNPAUSE",
    CryptoApproveAllowance = 48 => "CRYPTOAPPROVEALLOWANCE",
    CryptoDeleteAllowance = 49 => "CRYPTODELETEALLOWANCE",
    EthereumTransaction = 50 => "ETHEREUMTRANSACTION",
    NodeStakeUpdate = 51 => "NODESTAKEUPDATE",
    UtilPrng = 52 => "UTILPRNG",
    TokenUpdateNfts = 53 => "TOKENUPDATENFTS",
    NodeCreate = 54 => "NODECREATE",
    NodeUpdate = 55 => "NODEUPDATE",
    NodeDelete = 56 => "NODEDELETE",
    TokenReject = 57 => "TOKENREJECT",
    TokenAirdrop = 58 => "TOKENAIRDROP",
    TokenCancelAirdrop = 59 => "TOKENCANCELAIRDROP",
    TokenClaimAirdrop = 60 => "TOKENCLAIMAIRDROP",
}

impl TransactionType {
    /// Kind of a decoded body.
    pub fn of(data: Option<&Data>) -> Self {
        let Some(data) = data else {
            return TransactionType::Unknown;
        };
        match data {
            Data::ContractCall(_) => TransactionType::ContractCall,
            Data::ContractCreateInstance(_) => TransactionType::ContractCreateInstance,
            Data::ContractUpdateInstance(_) => TransactionType::ContractUpdateInstance,
            Data::CryptoAddLiveHash(_) => TransactionType::CryptoAddLiveHash,
            Data::CryptoCreateAccount(_) => TransactionType::CryptoCreateAccount,
            Data::CryptoDelete(_) => TransactionType::CryptoDelete,
            Data::CryptoDeleteLiveHash(_) => TransactionType::CryptoDeleteLiveHash,
            Data::CryptoTransfer(_) => TransactionType::CryptoTransfer,
            Data::CryptoUpdateAccount(_) => TransactionType::CryptoUpdateAccount,
            Data::FileAppend(_) => TransactionType::FileAppend,
            Data::FileCreate(_) => TransactionType::FileCreate,
            Data::FileDelete(_) => TransactionType::FileDelete,
            Data::FileUpdate(_) => TransactionType::FileUpdate,
            Data::SystemDelete(_) => TransactionType::SystemDelete,
            Data::SystemUndelete(_) => TransactionType::SystemUndelete,
            Data::ContractDeleteInstance(_) => TransactionType::ContractDeleteInstance,
            Data::Freeze(_) => TransactionType::Freeze,
            Data::ConsensusCreateTopic(_) => TransactionType::ConsensusCreateTopic,
            Data::ConsensusUpdateTopic(_) => TransactionType::ConsensusUpdateTopic,
            Data::ConsensusDeleteTopic(_) => TransactionType::ConsensusDeleteTopic,
            Data::ConsensusSubmitMessage(_) => TransactionType::ConsensusSubmitMessage,
            Data::UncheckedSubmit(_) => TransactionType::UncheckedSubmit,
            Data::TokenCreation(_) => TransactionType::TokenCreation,
            Data::TokenFreeze(_) => TransactionType::TokenFreeze,
            Data::TokenUnfreeze(_) => TransactionType::TokenUnfreeze,
            Data::TokenGrantKyc(_) => TransactionType::TokenGrantKyc,
            Data::TokenRevokeKyc(_) => TransactionType::TokenRevokeKyc,
            Data::TokenDeletion(_) => TransactionType::TokenDeletion,
            Data::TokenUpdate(_) => TransactionType::TokenUpdate,
            Data::TokenMint(_) => TransactionType::TokenMint,
            Data::TokenBurn(_) => TransactionType::TokenBurn,
            Data::TokenWipe(_) => TransactionType::TokenWipe,
            Data::TokenAssociate(_) => TransactionType::TokenAssociate,
            Data::TokenDissociate(_) => TransactionType::TokenDissociate,
            Data::ScheduleCreate(_) => TransactionType::ScheduleCreate,
            Data::ScheduleDelete(_) => TransactionType::ScheduleDelete,
            Data::ScheduleSign(_) => TransactionType::ScheduleSign,
            Data::TokenFeeScheduleUpdate(_) => TransactionType::TokenFeeScheduleUpdate,
            Data::TokenPause(_) => TransactionType::TokenPause,
            Data::TokenUnpause(_) => TransactionType::TokenUnpause,
            Data::CryptoApproveAllowance(_) => TransactionType::CryptoApproveAllowance,
            Data::CryptoDeleteAllowance(_) => TransactionType::CryptoDeleteAllowance,
            Data::EthereumTransaction(_) => TransactionType::EthereumTransaction,
            Data::NodeStakeUpdate(_) => TransactionType::NodeStakeUpdate,
            Data::UtilPrng(_) => TransactionType::UtilPrng,
            Data::TokenUpdateNfts(_) => TransactionType::TokenUpdateNfts,
            Data::NodeCreate(_) => TransactionType::NodeCreate,
            Data::NodeUpdate(_) => TransactionType::NodeUpdate,
            Data::NodeDelete(_) => TransactionType::NodeDelete,
            Data::TokenReject(_) => TransactionType::TokenReject,
            Data::TokenAirdrop(_) => TransactionType::TokenAirdrop,
            Data::TokenCancelAirdrop(_) => TransactionType::TokenCancelAirdrop,
            Data::TokenClaimAirdrop(_) => TransactionType::TokenClaimAirdrop,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::CryptoTransferBody;
    use std::collections::HashSet;

    #[test]
    fn test_codes_round_trip() {
        for ty in TransactionType::ALL {
            assert_eq!(TransactionType::from_code(ty.code()), *ty);
        }
        assert_eq!(TransactionType::from_code(30), TransactionType::Unknown);
        assert_eq!(TransactionType::from_code(1000), TransactionType::Unknown);
    }

    #[test]
    fn test_all_is_complete_and_unique() {
        let codes: HashSet<i32> = TransactionType::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes.len(), TransactionType::ALL.len());
        assert_eq!(TransactionType::ALL.len(), 54);
        assert_eq!(TransactionType::ALL.last(), Some(&TransactionType::Unknown));
    }

    #[test]
    fn test_of_body() {
        let data = Data::CryptoTransfer(CryptoTransferBody::default());
        assert_eq!(TransactionType::of(Some(&data)), TransactionType::CryptoTransfer);
        assert_eq!(TransactionType::of(None), TransactionType::Unknown);
        assert_eq!(TransactionType::CryptoTransfer.to_string(), "CRYPTOTRANSFER");
    }
}
