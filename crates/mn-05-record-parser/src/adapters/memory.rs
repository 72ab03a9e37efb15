//! In-memory alias index for tests and standalone parsing.

use crate::domain::errors::ParserError;
use crate::ports::outbound::EntityLookup;
use parking_lot::RwLock;
use shared_types::EntityId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryEntityLookup {
    aliases: RwLock<HashMap<Vec<u8>, EntityId>>,
    evm_addresses: RwLock<HashMap<Vec<u8>, EntityId>>,
}

impl InMemoryEntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_alias(&self, alias: &[u8], id: EntityId) {
        self.aliases.write().insert(alias.to_vec(), id);
    }

    pub fn insert_evm_address(&self, evm_address: &[u8], id: EntityId) {
        self.evm_addresses.write().insert(evm_address.to_vec(), id);
    }
}

impl EntityLookup for InMemoryEntityLookup {
    fn find_by_alias(&self, alias: &[u8]) -> Result<Option<EntityId>, ParserError> {
        Ok(self.aliases.read().get(alias).copied())
    }

    fn find_by_evm_address(&self, evm_address: &[u8]) -> Result<Option<EntityId>, ParserError> {
        Ok(self.evm_addresses.read().get(evm_address).copied())
    }
}
