//! Topics and topic messages.

use super::{
    duration_patch, key_patch, receipt_or_body, timestamp_patch, EntityOperation, HandlerContext,
    TransactionHandler,
};
use crate::domain::entities::{Entity, EntityType};
use crate::domain::errors::ParserError;
use crate::domain::records::{TopicMessage, TopicMessageLookup, TransactionRow};
use crate::service::entity_id::EntityIdService;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use prost::Message;
use shared_types::{EntityId, Patch};

pub struct CreateTopicHandler;

impl TransactionHandler for CreateTopicHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ConsensusCreateTopic
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        receipt_or_body(ids, item.receipt().and_then(|r| r.topic_id.as_ref()), None)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ConsensusCreateTopic(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::Topic);
        entity.memo = Patch::Set(body.memo.clone());
        entity.key = key_patch(body.admin_key.as_ref());
        entity.submit_key = key_patch(body.submit_key.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        if body.auto_renew_account.is_some() {
            let account = ctx.account(item, body.auto_renew_account.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        Ok(())
    }
}

pub struct UpdateTopicHandler;

impl TransactionHandler for UpdateTopicHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ConsensusUpdateTopic
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ConsensusUpdateTopic(body)) => body.topic_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, item.receipt().and_then(|r| r.topic_id.as_ref()), body)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::ConsensusUpdateTopic(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.memo = Patch::from_option(body.memo.clone());
        entity.key = key_patch(body.admin_key.as_ref());
        entity.submit_key = key_patch(body.submit_key.as_ref());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        entity.auto_renew_period = duration_patch(body.auto_renew_period.as_ref());
        if body.auto_renew_account.is_some() {
            let account = ctx.account(item, body.auto_renew_account.as_ref())?;
            entity.auto_renew_account_id = Patch::Set(account);
        }
        Ok(())
    }
}

pub struct DeleteTopicHandler;

impl TransactionHandler for DeleteTopicHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ConsensusDeleteTopic
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ConsensusDeleteTopic(body)) => body.topic_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, item.receipt().and_then(|r| r.topic_id.as_ref()), body)
    }
}

/// Writes the message and, when enabled, widens the topic's lookup ranges.
pub struct SubmitMessageHandler;

impl TransactionHandler for SubmitMessageHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::ConsensusSubmitMessage
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::ConsensusSubmitMessage(body)) => body.topic_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, body, None)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let (Some(Data::ConsensusSubmitMessage(body)), Some(receipt)) =
            (item.body().data.as_ref(), item.receipt())
        else {
            return Ok(());
        };
        let chunk = body.chunk_info.as_ref();
        let message = TopicMessage {
            consensus_timestamp: transaction.consensus_timestamp,
            topic_id: transaction.entity_id,
            sequence_number: i64::try_from(receipt.topic_sequence_number).unwrap_or(i64::MAX),
            message: body.message.clone(),
            running_hash: receipt.topic_running_hash.clone(),
            running_hash_version: receipt.topic_running_hash_version,
            payer_account_id: transaction.payer_account_id,
            chunk_num: chunk.map(|c| c.number),
            chunk_total: chunk.map(|c| c.total),
            initial_transaction_id: chunk
                .and_then(|c| c.initial_transaction_id.as_ref())
                .map(|id| id.encode_to_vec()),
        };
        if ctx.config().topic_message_lookups {
            ctx.add(TopicMessageLookup::of(&message));
        }
        ctx.add(message);
        Ok(())
    }
}
