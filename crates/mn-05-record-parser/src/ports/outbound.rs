//! # Outbound Ports (Driven Ports)

use crate::domain::errors::ParserError;
use shared_types::EntityId;

/// Resolves accounts and contracts addressed by alias instead of number.
pub trait EntityLookup: Send + Sync {
    fn find_by_alias(&self, alias: &[u8]) -> Result<Option<EntityId>, ParserError>;

    fn find_by_evm_address(&self, evm_address: &[u8]) -> Result<Option<EntityId>, ParserError>;
}
