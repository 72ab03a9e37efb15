//! # Handler Registry
//!
//! [`handler_for`] is an exhaustive `match`, so a new [`TransactionType`]
//! does not compile until it is routed. [`HandlerRegistry::new`] also
//! checks at startup that every handler reports the kind it is routed for.

use super::consensus::{
    CreateTopicHandler, DeleteTopicHandler, SubmitMessageHandler, UpdateTopicHandler,
};
use super::contract::{
    ContractCallHandler, ContractCreateHandler, ContractDeleteHandler, ContractUpdateHandler,
    EthereumTransactionHandler,
};
use super::crypto::{
    CryptoApproveAllowanceHandler, CryptoCreateHandler, CryptoDeleteAllowanceHandler,
    CryptoDeleteHandler, CryptoUpdateHandler,
};
use super::file::{
    FileAppendHandler, FileCreateHandler, FileDeleteHandler, FileUpdateHandler,
    SystemDeleteHandler, SystemUndeleteHandler,
};
use super::node::{NodeCreateHandler, NodeDeleteHandler, NodeStakeUpdateHandler, NodeUpdateHandler};
use super::schedule::{ScheduleCreateHandler, ScheduleDeleteHandler, ScheduleSignHandler};
use super::token::{
    TokenAccountStatusHandler, TokenAirdropHandler, TokenAirdropResolutionHandler,
    TokenAssociationHandler, TokenCreateHandler, TokenDeleteHandler, TokenPropertyHandler,
    TokenSupplyHandler, TokenUpdateHandler, TokenUpdateNftsHandler,
};
use super::{DefaultHandler, TransactionHandler};
use crate::domain::errors::ParserError;
use mn_03_stream_files::TransactionType;
use std::collections::HashMap;
use tracing::info;

/// The handler routed for `transaction_type`.
pub fn handler_for(transaction_type: TransactionType) -> Box<dyn TransactionHandler> {
    use TransactionType::*;
    match transaction_type {
        ContractCall => Box::new(ContractCallHandler),
        ContractCreateInstance => Box::new(ContractCreateHandler),
        ContractUpdateInstance => Box::new(ContractUpdateHandler),
        ContractDeleteInstance => Box::new(ContractDeleteHandler),
        EthereumTransaction => Box::new(EthereumTransactionHandler),
        CryptoCreateAccount => Box::new(CryptoCreateHandler),
        CryptoUpdateAccount => Box::new(CryptoUpdateHandler),
        CryptoDelete => Box::new(CryptoDeleteHandler),
        CryptoApproveAllowance => Box::new(CryptoApproveAllowanceHandler),
        CryptoDeleteAllowance => Box::new(CryptoDeleteAllowanceHandler),
        FileCreate => Box::new(FileCreateHandler),
        FileUpdate => Box::new(FileUpdateHandler),
        FileAppend => Box::new(FileAppendHandler),
        FileDelete => Box::new(FileDeleteHandler),
        SystemDelete => Box::new(SystemDeleteHandler),
        SystemUndelete => Box::new(SystemUndeleteHandler),
        ConsensusCreateTopic => Box::new(CreateTopicHandler),
        ConsensusUpdateTopic => Box::new(UpdateTopicHandler),
        ConsensusDeleteTopic => Box::new(DeleteTopicHandler),
        ConsensusSubmitMessage => Box::new(SubmitMessageHandler),
        TokenCreation => Box::new(TokenCreateHandler),
        TokenUpdate => Box::new(TokenUpdateHandler),
        TokenDeletion => Box::new(TokenDeleteHandler),
        TokenMint | TokenBurn | TokenWipe => Box::new(TokenSupplyHandler(transaction_type)),
        TokenAssociate | TokenDissociate => Box::new(TokenAssociationHandler(transaction_type)),
        TokenFreeze | TokenUnfreeze | TokenGrantKyc | TokenRevokeKyc => {
            Box::new(TokenAccountStatusHandler(transaction_type))
        }
        TokenPause | TokenUnpause | TokenFeeScheduleUpdate => {
            Box::new(TokenPropertyHandler(transaction_type))
        }
        TokenUpdateNfts => Box::new(TokenUpdateNftsHandler),
        TokenAirdrop => Box::new(TokenAirdropHandler),
        TokenCancelAirdrop | TokenClaimAirdrop => {
            Box::new(TokenAirdropResolutionHandler(transaction_type))
        }
        ScheduleCreate => Box::new(ScheduleCreateHandler),
        ScheduleSign => Box::new(ScheduleSignHandler),
        ScheduleDelete => Box::new(ScheduleDeleteHandler),
        NodeCreate => Box::new(NodeCreateHandler),
        NodeUpdate => Box::new(NodeUpdateHandler),
        NodeDelete => Box::new(NodeDeleteHandler),
        NodeStakeUpdate => Box::new(NodeStakeUpdateHandler),
        // Transfers, rejections and the rest only need the transaction row;
        // transfer lists are read by the dispatcher.
        CryptoTransfer | TokenReject | CryptoAddLiveHash | CryptoDeleteLiveHash | Freeze
        | UncheckedSubmit | UtilPrng | Unknown => Box::new(DefaultHandler(transaction_type)),
    }
}

pub struct HandlerRegistry {
    handlers: HashMap<TransactionType, Box<dyn TransactionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Result<Self, ParserError> {
        let mut handlers = HashMap::with_capacity(TransactionType::ALL.len());
        for transaction_type in TransactionType::ALL {
            let handler = handler_for(*transaction_type);
            let actual = handler.transaction_type();
            if actual != *transaction_type {
                return Err(ParserError::HandlerMismatch {
                    expected: *transaction_type,
                    actual,
                });
            }
            handlers.insert(*transaction_type, handler);
        }
        info!(handlers = handlers.len(), "Transaction handlers registered");
        Ok(Self { handlers })
    }

    pub fn get(&self, transaction_type: TransactionType) -> &dyn TransactionHandler {
        match self.handlers.get(&transaction_type) {
            Some(handler) => handler.as_ref(),
            None => &UNKNOWN,
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

static UNKNOWN: DefaultHandler = DefaultHandler(TransactionType::Unknown);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::EntityOperation;

    #[test]
    fn test_every_kind_is_routed_to_itself() {
        let registry = HandlerRegistry::new().unwrap();
        assert_eq!(registry.len(), TransactionType::ALL.len());
        for transaction_type in TransactionType::ALL {
            assert_eq!(
                registry.get(*transaction_type).transaction_type(),
                *transaction_type
            );
        }
    }

    #[test]
    fn test_entity_operations() {
        let registry = HandlerRegistry::new().unwrap();
        let operation = |t| registry.get(t).entity_operation();
        assert_eq!(operation(TransactionType::CryptoCreateAccount), EntityOperation::Create);
        assert_eq!(operation(TransactionType::CryptoUpdateAccount), EntityOperation::Update);
        assert_eq!(operation(TransactionType::CryptoDelete), EntityOperation::Delete);
        assert_eq!(operation(TransactionType::CryptoTransfer), EntityOperation::None);
        assert_eq!(operation(TransactionType::ConsensusSubmitMessage), EntityOperation::None);
    }

    #[test]
    fn test_contract_kinds_write_results() {
        let registry = HandlerRegistry::new().unwrap();
        assert!(registry.get(TransactionType::ContractCall).has_contract_result());
        assert!(registry.get(TransactionType::EthereumTransaction).has_contract_result());
        assert!(!registry.get(TransactionType::FileCreate).has_contract_result());
    }
}
