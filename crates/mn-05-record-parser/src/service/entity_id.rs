//! # Entity Id Service
//!
//! Resolves the identifiers a transaction references. Numeric ids go
//! through the bounded [`EntityIdCache`]. Aliases and EVM addresses are
//! resolved from entities created earlier in the stream, first from a
//! bounded cache and then through the [`EntityLookup`] port.

use crate::domain::entities::Entity;
use crate::domain::errors::ParserError;
use crate::ports::outbound::EntityLookup;
use lru::LruCache;
use mn_03_stream_files::proto::{AccountId, ContractId, ShardRealmNum};
use parking_lot::Mutex;
use shared_types::{EntityId, EntityIdCache, Patch};
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const EVM_ADDRESS_LEN: usize = 20;

pub struct EntityIdService {
    ids: EntityIdCache,
    aliases: Mutex<LruCache<Vec<u8>, EntityId>>,
    evm_addresses: Mutex<LruCache<Vec<u8>, EntityId>>,
    lookup: Arc<dyn EntityLookup>,
}

impl EntityIdService {
    pub fn new(lookup: Arc<dyn EntityLookup>, capacity: usize) -> Self {
        let bounded = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ids: EntityIdCache::new(capacity),
            aliases: Mutex::new(LruCache::new(bounded)),
            evm_addresses: Mutex::new(LruCache::new(bounded)),
            lookup,
        }
    }

    pub fn of(&self, shard: i64, realm: i64, num: i64) -> Result<EntityId, ParserError> {
        Ok(self.ids.of(shard, realm, num)?)
    }

    /// Files, topics, tokens and schedules.
    pub fn lookup(&self, id: &ShardRealmNum) -> Result<EntityId, ParserError> {
        self.of(id.shard_num, id.realm_num, id.num)
    }

    pub fn lookup_account(&self, account: &AccountId) -> Result<EntityId, ParserError> {
        if account.alias.is_empty() {
            return self.of(account.shard_num, account.realm_num, account.account_num);
        }
        if account.alias.len() == EVM_ADDRESS_LEN {
            return self.lookup_evm_address(&account.alias);
        }
        self.lookup_alias(&account.alias)
    }

    pub fn lookup_contract(&self, contract: &ContractId) -> Result<EntityId, ParserError> {
        if contract.evm_address.is_empty() {
            return self.of(contract.shard_num, contract.realm_num, contract.contract_num);
        }
        self.lookup_evm_address(&contract.evm_address)
    }

    /// The first contract id present that resolves. Receipt ids come first.
    pub fn lookup_first(&self, contracts: &[Option<&ContractId>]) -> Result<EntityId, ParserError> {
        let mut last_error = None;
        for contract in contracts.iter().flatten() {
            match self.lookup_contract(contract) {
                Ok(id) if !id.is_empty() => return Ok(id),
                Ok(_) => {}
                Err(e) => last_error = Some(e),
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(EntityId::EMPTY),
        }
    }

    fn lookup_alias(&self, alias: &[u8]) -> Result<EntityId, ParserError> {
        if let Some(id) = self.aliases.lock().get(alias) {
            return Ok(*id);
        }
        let id = self
            .lookup
            .find_by_alias(alias)?
            .ok_or_else(|| ParserError::Unresolved {
                kind: "alias",
                value: hex::encode(alias),
            })?;
        self.aliases.lock().put(alias.to_vec(), id);
        Ok(id)
    }

    fn lookup_evm_address(&self, address: &[u8]) -> Result<EntityId, ParserError> {
        if let Some(id) = self.long_zero(address)? {
            return Ok(id);
        }
        if let Some(id) = self.evm_addresses.lock().get(address) {
            return Ok(*id);
        }
        let id = self
            .lookup
            .find_by_evm_address(address)?
            .ok_or_else(|| ParserError::Unresolved {
                kind: "evm address",
                value: hex::encode(address),
            })?;
        self.evm_addresses.lock().put(address.to_vec(), id);
        Ok(id)
    }

    /// Addresses with a zero shard and realm prefix carry the entity number
    /// in their last eight bytes.
    fn long_zero(&self, address: &[u8]) -> Result<Option<EntityId>, ParserError> {
        if address.len() != EVM_ADDRESS_LEN || address[..12].iter().any(|b| *b != 0) {
            return Ok(None);
        }
        let mut num = [0u8; 8];
        num.copy_from_slice(&address[12..]);
        self.of(0, 0, i64::from_be_bytes(num)).map(Some)
    }

    /// Makes the alias and EVM address of a created entity resolvable
    /// before the file that created it is committed.
    pub fn notify(&self, entity: &Entity) {
        if let Patch::Set(alias) = &entity.alias {
            if !alias.is_empty() {
                self.aliases.lock().put(alias.clone(), entity.id);
            }
        }
        if let Patch::Set(address) = &entity.evm_address {
            if !address.is_empty() {
                self.evm_addresses.lock().put(address.clone(), entity.id);
            }
        }
    }
}

impl std::fmt::Debug for EntityIdService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityIdService")
            .field("ids", &self.ids)
            .field("aliases", &self.aliases.lock().len())
            .field("evm_addresses", &self.evm_addresses.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryEntityLookup;

    fn service() -> (EntityIdService, Arc<InMemoryEntityLookup>) {
        let lookup = Arc::new(InMemoryEntityLookup::new());
        (EntityIdService::new(lookup.clone(), 16), lookup)
    }

    fn id(num: i64) -> EntityId {
        EntityId::encode(0, 0, num).unwrap()
    }

    #[test]
    fn test_numeric_account() {
        let (service, _) = service();
        assert_eq!(
            service.lookup_account(&AccountId::from_entity_id(id(1001))).unwrap(),
            id(1001)
        );
        let invalid = AccountId {
            account_num: -1,
            ..Default::default()
        };
        assert!(service.lookup_account(&invalid).unwrap_err().is_recoverable());
    }

    #[test]
    fn test_alias_from_store_and_notification() {
        let (service, lookup) = service();
        let alias = AccountId {
            alias: vec![9; 33],
            ..Default::default()
        };
        assert!(matches!(
            service.lookup_account(&alias),
            Err(ParserError::Unresolved { kind: "alias", .. })
        ));

        lookup.insert_alias(&[9; 33], id(5));
        assert_eq!(service.lookup_account(&alias).unwrap(), id(5));

        let mut created = Entity::new(id(6), 1);
        created.alias = Patch::Set(vec![7; 33]);
        service.notify(&created);
        let other = AccountId {
            alias: vec![7; 33],
            ..Default::default()
        };
        assert_eq!(service.lookup_account(&other).unwrap(), id(6));
    }

    #[test]
    fn test_long_zero_evm_address() {
        let (service, _) = service();
        let mut address = vec![0u8; 20];
        address[19] = 0x10;
        let contract = ContractId {
            evm_address: address,
            ..Default::default()
        };
        assert_eq!(service.lookup_contract(&contract).unwrap(), id(16));
    }

    #[test]
    fn test_lookup_first_prefers_earlier_ids() {
        let (service, _) = service();
        let receipt = ContractId::from_entity_id(id(10));
        let body = ContractId::from_entity_id(id(11));
        let unknown = ContractId {
            evm_address: vec![1; 20],
            ..Default::default()
        };

        assert_eq!(service.lookup_first(&[Some(&receipt), Some(&body)]).unwrap(), id(10));
        assert_eq!(service.lookup_first(&[None, Some(&body)]).unwrap(), id(11));
        assert_eq!(service.lookup_first(&[Some(&unknown), Some(&body)]).unwrap(), id(11));
        assert_eq!(service.lookup_first(&[None, None]).unwrap(), EntityId::EMPTY);
        assert!(service.lookup_first(&[Some(&unknown)]).is_err());
    }
}
