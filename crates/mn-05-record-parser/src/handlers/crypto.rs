//! Account lifecycle and allowances.

use super::{
    apply_staking, duration_patch, key_patch, timestamp_patch, EntityOperation,
    HandlerContext, TransactionHandler,
};
use crate::domain::entities::{CryptoAllowance, Entity, EntityType, Nft, NftAllowance, TokenAllowance};
use crate::domain::errors::ParserError;
use crate::domain::records::TransactionRow;
use crate::service::entity_id::EntityIdService;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{EntityId, Patch, TimestampRange};

pub struct CryptoCreateHandler;

impl TransactionHandler for CryptoCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CryptoCreateAccount
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.receipt().and_then(|r| r.account_id.as_ref()) {
            Some(account) => ids.lookup_account(account),
            None => Ok(EntityId::EMPTY),
        }
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::CryptoCreateAccount(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let record = item.record();
        entity.entity_type = Patch::Set(EntityType::Account);
        entity.key = key_patch(body.key.as_ref());
        entity.memo = Patch::Set(body.memo.clone());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        entity.receiver_sig_required = Patch::Set(body.receiver_sig_required);
        entity.max_automatic_token_associations = Patch::Set(body.max_automatic_token_associations);
        entity.decline_reward = Patch::Set(body.decline_reward);

        let alias = if record.alias.is_empty() { &body.alias } else { &record.alias };
        if !alias.is_empty() {
            entity.alias = Patch::Set(alias.clone());
        }
        if !record.evm_address.is_empty() {
            entity.evm_address = Patch::Set(record.evm_address.clone());
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

pub struct CryptoUpdateHandler;

impl TransactionHandler for CryptoUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CryptoUpdateAccount
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.body().data.as_ref() {
            Some(Data::CryptoUpdateAccount(body)) => match body.account_id_to_update.as_ref() {
                Some(account) => ids.lookup_account(account),
                None => Ok(EntityId::EMPTY),
            },
            _ => Ok(EntityId::EMPTY),
        }
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::CryptoUpdateAccount(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.key = key_patch(body.key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        entity.memo = Patch::from_option(body.memo.clone());
        entity.max_automatic_token_associations =
            Patch::from_option(body.max_automatic_token_associations);
        entity.receiver_sig_required = Patch::from_option(body.receiver_sig_required);
        entity.decline_reward = Patch::from_option(body.decline_reward);

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

pub struct CryptoDeleteHandler;

impl TransactionHandler for CryptoDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CryptoDelete
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.body().data.as_ref() {
            Some(Data::CryptoDelete(body)) => match body.delete_account_id.as_ref() {
                Some(account) => ids.lookup_account(account),
                None => Ok(EntityId::EMPTY),
            },
            _ => Ok(EntityId::EMPTY),
        }
    }

    /// An obtainer that is missing or does not resolve is a recoverable
    /// error and is stored as EMPTY.
    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::CryptoDelete(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::Account);
        let obtainer = match body.transfer_account_id.as_ref() {
            Some(account) => ctx.account(item, Some(account))?,
            None => {
                let missing = ParserError::Unresolved {
                    kind: "obtainer",
                    value: "none".to_string(),
                };
                ctx.recoverable(item, &missing)?;
                EntityId::EMPTY
            }
        };
        entity.obtainer_id = Patch::Set(obtainer);
        Ok(())
    }
}

pub struct CryptoApproveAllowanceHandler;

impl TransactionHandler for CryptoApproveAllowanceHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CryptoApproveAllowance
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::CryptoApproveAllowance(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let payer = transaction.payer_account_id;
        let range = TimestampRange::at_least(transaction.consensus_timestamp);
        // An absent owner means the payer approves its own allowance.
        let owner_or_payer = |owner: EntityId| if owner.is_empty() { payer } else { owner };

        for allowance in &body.crypto_allowances {
            let owner = owner_or_payer(ctx.account(item, allowance.owner.as_ref())?);
            let spender = ctx.account(item, allowance.spender.as_ref())?;
            ctx.add(CryptoAllowance {
                owner,
                spender,
                amount: Patch::Set(allowance.amount),
                payer_account_id: Patch::Set(payer),
                timestamp_range: range,
            });
        }

        for allowance in &body.token_allowances {
            let owner = owner_or_payer(ctx.account(item, allowance.owner.as_ref())?);
            let spender = ctx.account(item, allowance.spender.as_ref())?;
            let token_id = ctx.id(item, allowance.token_id.as_ref())?;
            ctx.add(TokenAllowance {
                owner,
                spender,
                token_id,
                amount: Patch::Set(allowance.amount),
                payer_account_id: Patch::Set(payer),
                timestamp_range: range,
            });
        }

        for allowance in &body.nft_allowances {
            let owner = owner_or_payer(ctx.account(item, allowance.owner.as_ref())?);
            let spender = ctx.account(item, allowance.spender.as_ref())?;
            let token_id = ctx.id(item, allowance.token_id.as_ref())?;
            if let Some(approved_for_all) = allowance.approved_for_all {
                ctx.add(NftAllowance {
                    owner,
                    spender,
                    token_id,
                    approved_for_all: Patch::Set(approved_for_all),
                    payer_account_id: Patch::Set(payer),
                    timestamp_range: range,
                });
            }
            for serial_number in &allowance.serial_numbers {
                let mut nft = Nft::new(token_id, *serial_number, transaction.consensus_timestamp);
                nft.spender = Patch::Set(spender);
                ctx.add(nft);
            }
        }
        Ok(())
    }
}

pub struct CryptoDeleteAllowanceHandler;

impl TransactionHandler for CryptoDeleteAllowanceHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CryptoDeleteAllowance
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::CryptoDeleteAllowance(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        for allowance in &body.nft_allowances {
            ctx.account(item, allowance.owner.as_ref())?;
            let token_id = ctx.id(item, allowance.token_id.as_ref())?;
            for serial_number in &allowance.serial_numbers {
                let mut nft = Nft::new(token_id, *serial_number, transaction.consensus_timestamp);
                nft.spender = Patch::Null;
                ctx.add(nft);
            }
        }
        Ok(())
    }
}

