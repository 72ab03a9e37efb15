//! File service transactions, including the address book files.
//!
//! Updates and appends to 0.0.101 and 0.0.102 feed the address book stage
//! as well as the file data table. A stage error never fails the file: it
//! is a recoverable error and the contents stay buffered.

use super::{
    key_patch, receipt_or_body, timestamp_patch, EntityOperation, HandlerContext,
    TransactionHandler,
};
use crate::domain::entities::{Entity, EntityType};
use crate::domain::errors::ParserError;
use crate::domain::records::{FileData, TransactionRow};
use crate::service::entity_id::EntityIdService;
use mn_01_address_book::is_address_book_file;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{EntityId, Patch};
use tracing::debug;

fn file_data(transaction: &TransactionRow, contents: &[u8]) -> FileData {
    FileData {
        consensus_timestamp: transaction.consensus_timestamp,
        entity_id: transaction.entity_id,
        transaction_type: transaction.transaction_type,
        file_data: contents.to_vec(),
    }
}

/// Hands address book contents to the stage when one is attached.
fn stage_contents(
    transaction: &TransactionRow,
    item: &RecordItem,
    ctx: &mut HandlerContext<'_>,
    contents: &[u8],
    append: bool,
) -> Result<(), ParserError> {
    let file_id = transaction.entity_id;
    if !is_address_book_file(file_id) {
        return Ok(());
    }
    let consensus_timestamp = transaction.consensus_timestamp;
    let Some(result) = ctx.stage_mut().map(|stage| {
        let completed = if append {
            stage.on_file_append(file_id, consensus_timestamp, contents)
        } else {
            stage.on_file_update(file_id, consensus_timestamp, contents)
        };
        completed.map(|book| book.is_some())
    }) else {
        debug!(file_id = %file_id, "No address book stage attached");
        return Ok(());
    };
    match result {
        Ok(completed) => {
            debug!(file_id = %file_id, completed, "Staged address book contents");
            Ok(())
        }
        Err(e) => ctx.recoverable(item, &ParserError::AddressBook(e)),
    }
}

pub struct FileCreateHandler;

impl TransactionHandler for FileCreateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::FileCreate
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Create
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        receipt_or_body(ids, item.receipt().and_then(|r| r.file_id.as_ref()), None)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::FileCreate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.entity_type = Patch::Set(EntityType::File);
        entity.key = key_patch(body.keys.as_ref());
        entity.memo = Patch::Set(body.memo.clone());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        Ok(())
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        if let Some(Data::FileCreate(body)) = item.body().data.as_ref() {
            ctx.add(file_data(transaction, &body.contents));
        }
        Ok(())
    }
}

pub struct FileUpdateHandler;

impl TransactionHandler for FileUpdateHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::FileUpdate
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::FileUpdate(body)) => body.file_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, item.receipt().and_then(|r| r.file_id.as_ref()), body)
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::FileUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        entity.key = key_patch(body.keys.as_ref());
        entity.memo = Patch::from_option(body.memo.clone());
        entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        Ok(())
    }

    /// Metadata-only updates carry no contents and write no file data.
    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::FileUpdate(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        if body.contents.is_empty() {
            return Ok(());
        }
        ctx.add(file_data(transaction, &body.contents));
        stage_contents(transaction, item, ctx, &body.contents, false)
    }
}

pub struct FileAppendHandler;

impl TransactionHandler for FileAppendHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::FileAppend
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::FileAppend(body)) => body.file_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, item.receipt().and_then(|r| r.file_id.as_ref()), body)
    }

    fn update_transaction(
        &self,
        transaction: &TransactionRow,
        item: &RecordItem,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        let Some(Data::FileAppend(body)) = item.body().data.as_ref() else {
            return Ok(());
        };
        ctx.add(file_data(transaction, &body.contents));
        stage_contents(transaction, item, ctx, &body.contents, true)
    }
}

pub struct FileDeleteHandler;

impl TransactionHandler for FileDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::FileDelete
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        let body = match item.body().data.as_ref() {
            Some(Data::FileDelete(body)) => body.file_id.as_ref(),
            _ => None,
        };
        receipt_or_body(ids, item.receipt().and_then(|r| r.file_id.as_ref()), body)
    }
}

/// Administrative delete of a file or contract.
pub struct SystemDeleteHandler;

impl TransactionHandler for SystemDeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::SystemDelete
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Delete
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.body().data.as_ref() {
            Some(Data::SystemDelete(body)) => match (&body.file_id, &body.contract_id) {
                (Some(file), _) => ids.lookup(file),
                (None, Some(contract)) => ids.lookup_contract(contract),
                (None, None) => Ok(EntityId::EMPTY),
            },
            _ => Ok(EntityId::EMPTY),
        }
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        if let Some(Data::SystemDelete(body)) = item.body().data.as_ref() {
            entity.expiration_timestamp = timestamp_patch(body.expiration_time.as_ref());
        }
        Ok(())
    }
}

pub struct SystemUndeleteHandler;

impl TransactionHandler for SystemUndeleteHandler {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::SystemUndelete
    }

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::Update
    }

    fn entity_id(&self, item: &RecordItem, ids: &EntityIdService) -> Result<EntityId, ParserError> {
        match item.body().data.as_ref() {
            Some(Data::SystemUndelete(body)) => match (&body.file_id, &body.contract_id) {
                (Some(file), _) => ids.lookup(file),
                (None, Some(contract)) => ids.lookup_contract(contract),
                (None, None) => Ok(EntityId::EMPTY),
            },
            _ => Ok(EntityId::EMPTY),
        }
    }

    fn update_entity(
        &self,
        entity: &mut Entity,
        _item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        entity.deleted = Patch::Set(false);
        Ok(())
    }
}
