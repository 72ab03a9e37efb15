//! Scheduled transactions.

use super::{
    key_patch, receipt_or_body, timestamp_patch, EntityOperation, HandlerContext,
    TransactionHandler,
};
use crate::domain::entities::{Entity, EntityType, Schedule};
use crate::domain::errors::ParserError;
use crate::domain::records::TransactionRow;
use crate::service::entity_id::EntityIdService;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{EntityId, Patch};

fn schedule_entity_id(item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
    let body = match item.body().data.as_ref() {
        Some(Data::ScheduleSign(body)) | Some(Data::ScheduleDelete(body)) => {
            body.schedule_id.as_ref()
        }
        _ => None,
    };
    receipt_or_body(ids, item.receipt().and_then(|r| r.schedule_id.as_ref()), body)
}

pub struct ScheduleCreateHandler;

impl TransactionHandler for ScheduleCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ScheduleCreate
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        schedule_entity_id(item, ids)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ScheduleCreate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::Schedule);
        entity.memo = Patch::Set(body.memo.clone());
        entity.key = key_patch(body.admin_key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        Ok(())
    }

    /// The payer of the inner transaction defaults to the creator.
    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ScheduleCreate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        let creator = transaction.payer_account_id;
        let payer = match body.payer_account_id.as_ref() {
            Some(_) => ctx.account(item, body.payer_account_id.as_ref())?,
            None => creator,
        };
        let mut schedule = Schedule::new(transaction.entity_id);
        schedule.consensus_timestamp = Patch::Set(transaction.consensus_timestamp);
        schedule.creator_account_id = Patch::Set(creator);
        schedule.payer_account_id = Patch::Set(payer);
        schedule.transaction_body = Patch::Set(body.scheduled_transaction_body.clone());
        schedule.expiration_time = timestamp_patch(body.expiration_time.as_ref());
        schedule.wait_for_expiry = Patch::Set(body.wait_for_expiry);
        ctx.add(schedule);
        Ok(())
    }
}

/// Signatures are not tracked; the transaction row is all a sign leaves.
pub struct ScheduleSignHandler;

impl TransactionHandler for ScheduleSignHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ScheduleSign
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        schedule_entity_id(item, ids)
    }
}

pub struct ScheduleDeleteHandler;

impl TransactionHandler for ScheduleDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ScheduleDelete
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        schedule_entity_id(item, ids)
    }
}
