//! # Transaction Handlers
//!
//! One [`TransactionHandler`] per [`TransactionType`]. The dispatcher builds
//! the transaction row for every item and calls into the handler for what
//! only the transaction kind knows:
//!
//! | Hook | Runs | Produces |
//! |------|------|----------|
//! | `entity_id` | always | primary entity of the transaction row |
//! | `update_entity` | successful items with an entity operation | entity columns |
//! | `update_transaction` | successful items | side table rows |
//! | `update_contract_result` | items with a contract result | contract result columns |

pub mod consensus;
pub mod contract;
pub mod crypto;
pub mod file;
pub mod node;
pub mod registry;
pub mod schedule;
pub mod token;

use crate::domain::config::ParserConfig;
use crate::domain::context::{ParserContext, TableOf, Tables};
use crate::domain::entities::Entity;
use crate::domain::errors::ParserError;
use crate::domain::records::{ContractResult, TransactionRow};
use crate::domain::row::Row;
use crate::service::entity_id::EntityIdService;
use mirror_telemetry::metrics;
use mn_01_address_book::AddressBookStage;
use mn_03_stream_files::proto::{AccountId, ContractId, Duration, Key, ShardRealmNum, Timestamp};
use mn_03_stream_files::{RecordItem, TransactionType};
use shared_types::{ConsensusTimestamp, EntityId, Patch};
use tracing::warn;

pub use registry::HandlerRegistry;

/// What a successful transaction does to its primary entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOperation {
    None,
    Create,
    Update,
    Delete,
}

pub trait TransactionHandler: Send + Sync {
    fn transaction_type(&self) -> TransactionType;

    fn entity_operation(&self) -> EntityOperation {
        EntityOperation::None
    }

    /// Primary entity, receipt first. EMPTY when the kind has none.
    fn entity_id(&self, _item: &RecordItem, _ids: &EntityIdService) -> Result<EntityId, ParserError> {
        Ok(EntityId::EMPTY)
    }

    fn update_entity(
        &self,
        _entity: &mut Entity,
        _item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        Ok(())
    }

    fn update_transaction(
        &self,
        _transaction: &TransactionRow,
        _item: &RecordItem,
        _ctx: &mut HandlerContext<'_>,
    ) -> Result<(), ParserError> {
        Ok(())
    }

    /// Whether a contract result row is written even when the record
    /// carries none.
    fn has_contract_result(&self) -> bool {
        false
    }

    fn update_contract_result(&self, _result: &mut ContractResult, _item: &RecordItem) {}
}

/// Handler for kinds without effects beyond the transaction row.
#[derive(Debug, Clone, Copy)]
pub struct DefaultHandler(pub TransactionType);

impl TransactionHandler for DefaultHandler {
    fn transaction_type(&self) -> TransactionType {
        self.0
    }
}

// =============================================================================
// HANDLER CONTEXT
// =============================================================================

/// Mutable state handed to handlers while one item is dispatched.
pub struct HandlerContext<'a> {
    pub entity_ids: &'a EntityIdService,
    rows: &'a mut ParserContext,
    config: &'a ParserConfig,
    referenced: Vec<EntityId>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        entity_ids: &'a EntityIdService,
        rows: &'a mut ParserContext,
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            entity_ids,
            rows,
            config,
            referenced: Vec::new(),
        }
    }

    pub fn add<R: Row>(&mut self, row: R)
    where
        Tables: TableOf<R>,
    {
        self.rows.add(row);
    }

    pub fn config(&self) -> &ParserConfig {
        self.config
    }

    pub fn stage_mut(&mut self) -> Option<&mut AddressBookStage> {
        self.rows.stage_mut()
    }

    /// Logs and counts a recoverable error. Fails instead when
    /// `halt_on_error` is set.
    pub fn recoverable(&mut self, item: &RecordItem, error: &ParserError) -> Result<(), ParserError> {
        let kind = match error {
            ParserError::Unresolved { .. } => "unresolved_entity",
            ParserError::EntityId(_) => "invalid_entity_id",
            ParserError::AddressBook(_) => "address_book",
            _ => "other",
        };
        metrics::record_recoverable_error(kind);
        self.rows.record_recoverable();
        warn!(
            consensus_timestamp = item.consensus_timestamp(),
            transaction_type = %item.transaction_type(),
            error = %error,
            "Recoverable error while parsing item"
        );
        if self.config.halt_on_error {
            return Err(ParserError::Recoverable {
                consensus_timestamp: item.consensus_timestamp(),
                message: error.to_string(),
            });
        }
        Ok(())
    }

    /// Ids resolved since the last call, to be recorded on the item.
    pub(crate) fn take_referenced(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.referenced)
    }

    /// Remembers a resolved id as referenced by the item. Recoverable
    /// failures resolve to EMPTY.
    pub fn resolve(
        &mut self,
        item: &RecordItem,
        result: Result<EntityId, ParserError>,
    ) -> Result<EntityId, ParserError> {
        match result {
            Ok(id) => {
                self.referenced.push(id);
                Ok(id)
            }
            Err(e) if e.is_recoverable() => {
                self.recoverable(item, &e)?;
                Ok(EntityId::EMPTY)
            }
            Err(e) => Err(e),
        }
    }

    pub fn account(
        &mut self,
        item: &RecordItem,
        account: Option<&AccountId>,
    ) -> Result<EntityId, ParserError> {
        match account {
            Some(account) => {
                let result = self.entity_ids.lookup_account(account);
                self.resolve(item, result)
            }
            None => Ok(EntityId::EMPTY),
        }
    }

    pub fn contract(
        &mut self,
        item: &RecordItem,
        contract: Option<&ContractId>,
    ) -> Result<EntityId, ParserError> {
        match contract {
            Some(contract) => {
                let result = self.entity_ids.lookup_contract(contract);
                self.resolve(item, result)
            }
            None => Ok(EntityId::EMPTY),
        }
    }

    /// Files, topics, tokens and schedules.
    pub fn id(
        &mut self,
        item: &RecordItem,
        id: Option<&ShardRealmNum>,
    ) -> Result<EntityId, ParserError> {
        match id {
            Some(id) => {
                let result = self.entity_ids.lookup(id);
                self.resolve(item, result)
            }
            None => Ok(EntityId::EMPTY),
        }
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Receipt id if set, otherwise the body's.
pub(crate) fn receipt_or_body(
    ids: &EntityIdService,
    receipt: Option<&ShardRealmNum>,
    body: Option<&ShardRealmNum>,
) -> Result<EntityId, ParserError> {
    match receipt.or(body) {
        Some(id) => ids.lookup(id),
        None => Ok(EntityId::EMPTY),
    }
}

pub(crate) fn key_patch(key: Option<&Key>) -> Patch<Vec<u8>> {
    Patch::from_option(key.map(|key| key.key_bytes().to_vec()))
}

pub(crate) fn duration_patch(duration: Option<&Duration>) -> Patch<i64> {
    Patch::from_option(duration.map(|duration| duration.seconds))
}

pub(crate) fn timestamp_patch(timestamp: Option<&Timestamp>) -> Patch<ConsensusTimestamp> {
    Patch::from_option(timestamp.map(Timestamp::to_nanos))
}

/// Empty strings leave the column alone.
pub(crate) fn text_patch(text: &str) -> Patch<String> {
    if text.is_empty() {
        Patch::Unset
    } else {
        Patch::Set(text.to_string())
    }
}

/// Staking target: an account, a node, or neither. Setting one clears the
/// other.
pub(crate) fn apply_staking(
    entity: &mut Entity,
    staked_account_id: EntityId,
    staked_node_id: Option<i64>,
    has_account: bool,
) {
    if has_account {
        entity.staked_account_id = Patch::Set(staked_account_id);
        entity.staked_node_id = Patch::Set(-1);
    } else if let Some(node_id) = staked_node_id {
        entity.staked_node_id = Patch::Set(node_id);
        entity.staked_account_id = Patch::Set(EntityId::EMPTY);
    }
}
