//! Smart contract lifecycle and calls.

use super::{
    apply_staking, duration_patch, key_patch, timestamp_patch, EntityOperation, HandlerContext,
    TransactionHandler,
};
use crate::domain::entities::{Entity, EntityType};
use crate::domain::errors::ParserError;
use crate::domain::records::ContractResult;
use crate::service::entity_id::EntityIdService;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{EntityId, Patch};

/// Receipt contract id, then the id the record's function result names.
fn receipt_or_result(item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
    ids.lookup_first(&[
        item.receipt().and_then(|r| r.contract_id.as_ref()),
        item.record()
            .contract_result()
            .and_then(|r| r.contract_id.as_ref()),
    ])
}

pub struct ContractCreateHandler;

impl TransactionHandler for ContractCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ContractCreateInstance
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        receipt_or_result(item, ids)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ContractCreateInstance(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::Contract);
        entity.key = key_patch(body.admin_key.as_ref());
        entity.memo = Patch::Set(body.memo.clone());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        entity.max_automatic_token_associations = Patch::Set(body.max_automatic_token_associations);
        entity.decline_reward = Patch::Set(body.decline_reward);
        if let Some(result) = item.record().contract_result() {
            if !result.evm_address.is_empty() {
                entity.evm_address = Patch::Set(result.evm_address.clone());
            }
        }
        if body.auto_renew_account_id.is_some() {
            let account = ctx.account(item, body.auto_renew_account_id.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        let staked_account = ctx.account(item, body.staked_account_id.as_ref())?;
        apply_staking(
            entity,
            staked_account,
            body.staked_node_id,
            body.staked_account_id.is_some(),
        );
        Ok(())
    }

    fn has_contract_result(&self) -> bool {
        true
    }

    fn update_contract_result(&self, result: &mut ContractResult, item: &RecordItem) {
        if let Some(Data::ContractCreateInstance(body)) = item.body().data.as_ref() {
            result.amount = body.initial_balance;
            result.gas_limit = body.gas;
        }
    }
}

pub struct ContractCallHandler;

impl TransactionHandler for ContractCallHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ContractCall
    }

    /// The receipt id wins over the body, which may only hold an EVM
    /// address.
    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ContractCall(body)) => body.contract_id.as_ref(),
            _ => None,
        };
        ids.lookup_first(&[item.receipt().and_then(|r| r.contract_id.as_ref()), body])
    }

    fn has_contract_result(&self) -> bool {
        true
    }

    fn update_contract_result(&self, result: &mut ContractResult, item: &RecordItem) {
        if let Some(Data::ContractCall(body)) = item.body().data.as_ref() {
            result.amount = body.amount;
            result.function_parameters = body.function_parameters.clone();
            result.gas_limit = body.gas;
        }
    }
}

pub struct ContractUpdateHandler;

impl TransactionHandler for ContractUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ContractUpdateInstance
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ContractUpdateInstance(body)) => body.contract_id.as_ref(),
            _ => None,
        };
        ids.lookup_first(&[item.receipt().and_then(|r| r.contract_id.as_ref()), body])
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ContractUpdateInstance(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.key = key_patch(body.admin_key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        entity.memo = Patch::from_option(body.memo.clone());
        entity.max_automatic_token_associations =
            Patch::from_option(body.max_automatic_token_associations);
        entity.decline_reward = Patch::from_option(body.decline_reward);
        if body.auto_renew_account_id.is_some() {
            let account = ctx.account(item, body.auto_renew_account_id.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        let staked_account = ctx.account(item, body.staked_account_id.as_ref())?;
        apply_staking(
            entity,
            staked_account,
            body.staked_node_id,
            body.staked_account_id.is_some(),
        );
        Ok(())
    }
}

pub struct ContractDeleteHandler;

impl TransactionHandler for ContractDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ContractDeleteInstance
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ContractDeleteInstance(body)) => body.contract_id.as_ref(),
            _ => None,
        };
        ids.lookup_first(&[item.receipt().and_then(|r| r.contract_id.as_ref()), body])
    }

    /// The balance goes to an account or to another contract.
    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ContractDeleteInstance(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let obtainer = if body.transfer_account_id.is_some() {
            ctx.account(item, body.transfer_account_id.as_ref())?
        } else {
            ctx.contract(item, body.transfer_contract_id.as_ref())?
        };
        entity.obtainer_id = Patch::Set(obtainer);
        entity.permanent_removal = Patch::Set(body.permanent_removal);
        Ok(())
    }
}

pub struct EthereumTransactionHandler;

impl TransactionHandler for EthereumTransactionHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::EthereumTransaction
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        receipt_or_result(item, ids)
    }

    fn has_contract_result(&self) -> bool {
        true
    }

    fn update_contract_result(&self, result: &mut ContractResult, item: &RecordItem) {
        if let Some(Data::EthereumTransaction(body)) = item.body().data.as_ref() {
            if result.gas_limit == 0 {
                result.gas_limit = body.max_gas_allowance;
            }
        }
    }
}
