//! # Item Dispatch
//!
//! Turns one record item into rows. The transaction row and the HBAR
//! transfers are written whatever the outcome, since fees are charged on
//! failure too. Entity and side table mutations need a successful result.
//! Every entity the item references gets an entity transaction row.

use crate::domain::entities::{Entity, Nft, Schedule, TokenAccount};
use crate::domain::errors::ParserError;
use crate::domain::records::{
    ContractResult, CryptoTransfer, EntityTransaction, TokenTransfer, TransactionRow,
};
use crate::handlers::{EntityOperation, HandlerContext, TransactionHandler};
use mn_03_stream_files::proto::{ContractFunctionResult, TokenTransferList};
use mn_03_stream_files::RecordItem;
use shared_types::{EntityId, Patch};

pub(crate) fn dispatch(
    handler: &dyn TransactionHandler,
    item: &mut RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<(), ParserError> {
    let resolved = handler.entity_id(item, ctx.entity_ids);
    let entity_id = ctx.resolve(item, resolved)?;
    let transaction = transaction_row(item, entity_id, ctx)?;

    if item.is_successful() {
        let operation = handler.entity_operation();
        if operation != EntityOperation::None && !entity_id.is_empty() {
            let entity = entity_mutation(handler, operation, entity_id, item, ctx)?;
            if operation == EntityOperation::Create {
                ctx.entity_ids.notify(&entity);
            }
            ctx.add(entity);
        }
        handler.update_transaction(&transaction, item, ctx)?;
        token_transfers(&transaction, item, ctx)?;
        automatic_associations(&transaction, item, ctx)?;
    }

    crypto_transfers(&transaction, item, ctx)?;
    if let Some(result) = item.record().contract_result() {
        let row = contract_result(handler, &transaction, result, item, ctx)?;
        ctx.add(row);
    } else if handler.has_contract_result() {
        let row = contract_result(handler, &transaction, &ContractFunctionResult::default(), item, ctx)?;
        ctx.add(row);
    }
    if let Some(schedule_id) = item.record().schedule_ref.as_ref() {
        if item.body().transaction_id.as_ref().is_some_and(|id| id.scheduled) {
            let schedule_id = ctx.id(item, Some(schedule_id))?;
            if !schedule_id.is_empty() {
                let mut schedule = Schedule::new(schedule_id);
                schedule.executed_timestamp = Patch::Set(transaction.consensus_timestamp);
                ctx.add(schedule);
            }
        }
    }

    for id in ctx.take_referenced() {
        item.add_entity_id(id);
    }
    for &entity_id in item.entity_ids() {
        ctx.add(EntityTransaction {
            consensus_timestamp: transaction.consensus_timestamp,
            entity_id,
            payer_account_id: transaction.payer_account_id,
            result: transaction.result,
            transaction_type: transaction.transaction_type,
        });
    }
    ctx.add(transaction);
    Ok(())
}

fn transaction_row(
    item: &RecordItem,
    entity_id: EntityId,
    ctx: &mut HandlerContext<'_>,
) -> Result<TransactionRow, ParserError> {
    let body = item.body();
    let record = item.record();
    let transaction_id = body.transaction_id.as_ref();
    let node_account_id = ctx.account(item, body.node_account_id.as_ref())?;
    Ok(TransactionRow {
        consensus_timestamp: item.consensus_timestamp(),
        transaction_type: item.transaction_type(),
        result: item.status().code(),
        payer_account_id: item.payer().unwrap_or(EntityId::EMPTY),
        node_account_id,
        entity_id,
        charged_tx_fee: record.transaction_fee,
        max_fee: body.transaction_fee,
        memo: body.memo.as_bytes().to_vec(),
        transaction_hash: record.transaction_hash.clone(),
        transaction_bytes: item.transaction_bytes().to_vec(),
        valid_start_ns: transaction_id
            .and_then(|id| id.transaction_valid_start.as_ref())
            .map_or(0, |ts| ts.to_nanos()),
        valid_duration_seconds: body
            .transaction_valid_duration
            .as_ref()
            .map_or(0, |d| d.seconds),
        nonce: item.nonce(),
        scheduled: transaction_id.is_some_and(|id| id.scheduled),
        parent_consensus_timestamp: item.parent_consensus_timestamp(),
        index: item.index(),
    })
}

fn entity_mutation(
    handler: &dyn TransactionHandler,
    operation: EntityOperation,
    entity_id: EntityId,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<Entity, ParserError> {
    let consensus_timestamp = item.consensus_timestamp();
    let mut entity = Entity::new(entity_id, consensus_timestamp);
    match operation {
        EntityOperation::Create => {
            entity.created_timestamp = Patch::Set(consensus_timestamp);
            entity.deleted = Patch::Set(false);
        }
        EntityOperation::Delete => entity.deleted = Patch::Set(true),
        EntityOperation::Update | EntityOperation::None => {}
    }
    handler.update_entity(&mut entity, item, ctx)?;
    Ok(entity)
}

fn crypto_transfers(
    transaction: &TransactionRow,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<(), ParserError> {
    let Some(transfers) = item.record().transfer_list.as_ref() else {
        return Ok(());
    };
    for transfer in &transfers.account_amounts {
        let entity_id = ctx.account(item, transfer.account_id.as_ref())?;
        ctx.add(CryptoTransfer {
            consensus_timestamp: transaction.consensus_timestamp,
            entity_id,
            amount: transfer.amount,
            payer_account_id: transaction.payer_account_id,
            is_approval: transfer.is_approval,
        });
    }
    Ok(())
}

/// Fungible transfers become transfer rows; NFT transfers move ownership.
fn token_transfers(
    transaction: &TransactionRow,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<(), ParserError> {
    let lists: &[TokenTransferList] = &item.record().token_transfer_lists;
    let consensus_timestamp = transaction.consensus_timestamp;
    for list in lists {
        let token_id = ctx.id(item, list.token.as_ref())?;
        for transfer in &list.transfers {
            let account_id = ctx.account(item, transfer.account_id.as_ref())?;
            ctx.add(TokenTransfer {
                consensus_timestamp,
                token_id,
                account_id,
                amount: transfer.amount,
                payer_account_id: transaction.payer_account_id,
                is_approval: transfer.is_approval,
            });
        }
        for transfer in &list.nft_transfers {
            ctx.account(item, transfer.sender_account_id.as_ref())?;
            let receiver = ctx.account(item, transfer.receiver_account_id.as_ref())?;
            // Burns and wipes transfer to nobody; their handler deletes the NFT.
            if receiver.is_empty() {
                continue;
            }
            let mut nft = Nft::new(token_id, transfer.serial_number, consensus_timestamp);
            nft.account_id = Patch::Set(receiver);
            nft.spender = Patch::Null;
            ctx.add(nft);
        }
    }
    Ok(())
}

fn automatic_associations(
    transaction: &TransactionRow,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<(), ParserError> {
    for association in &item.record().automatic_token_associations {
        let account_id = ctx.account(item, association.account_id.as_ref())?;
        let token_id = ctx.id(item, association.token_id.as_ref())?;
        if account_id.is_empty() || token_id.is_empty() {
            continue;
        }
        let mut relationship =
            TokenAccount::new(account_id, token_id, transaction.consensus_timestamp);
        relationship.associated = Patch::Set(true);
        relationship.created_timestamp = Patch::Set(transaction.consensus_timestamp);
        ctx.add(relationship);
    }
    Ok(())
}

fn contract_result(
    handler: &dyn TransactionHandler,
    transaction: &TransactionRow,
    result: &ContractFunctionResult,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
) -> Result<ContractResult, ParserError> {
    let contract_id = if result.contract_id.is_some() {
        ctx.contract(item, result.contract_id.as_ref())?
    } else {
        transaction.entity_id
    };
    let sender_id = match result.sender_id.as_ref() {
        Some(sender) => Some(ctx.account(item, Some(sender))?),
        None => None,
    };
    let mut created_contract_ids = Vec::with_capacity(result.created_contract_ids.len());
    for created in &result.created_contract_ids {
        created_contract_ids.push(ctx.contract(item, Some(created))?);
    }
    let mut row = ContractResult {
        consensus_timestamp: transaction.consensus_timestamp,
        contract_id,
        payer_account_id: transaction.payer_account_id,
        sender_id,
        amount: result.amount,
        gas_limit: result.gas,
        gas_used: result.gas_used,
        function_parameters: result.function_parameters.clone(),
        call_result: result.contract_call_result.clone(),
        error_message: result.error_message.clone(),
        bloom: result.bloom.clone(),
        created_contract_ids,
        transaction_result: transaction.result,
    };
    handler.update_contract_result(&mut row, item);
    Ok(row)
}
