//! # Entity Identifiers
//!
//! A ledger entity (account, contract, file, topic, token, schedule, node
//! account) is addressed by `shard.realm.num`. The triple is packed into one
//! non-negative 64-bit value:
//!
//! ```text
//! | shard (10 bits) | realm (16 bits) | num (38 bits) |
//! ```
//!
//! The packed value is the persisted key and the equality/ordering key.
//! `0.0.0` is the [`EntityId::EMPTY`] sentinel. The packed value is held
//! unsigned since the three fields fill all 64 bits.

use crate::errors::EntityIdError;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

const SHARD_BITS: u32 = 10;
const REALM_BITS: u32 = 16;
const NUM_BITS: u32 = 38;

const SHARD_MASK: i64 = (1 << SHARD_BITS) - 1;
const REALM_MASK: i64 = (1 << REALM_BITS) - 1;
const NUM_MASK: i64 = (1 << NUM_BITS) - 1;

/// Packed `shard.realm.num` identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct EntityId(u64);

impl EntityId {
    /// The `0.0.0` sentinel.
    pub const EMPTY: EntityId = EntityId(0);

    pub const MAX_SHARD: i64 = SHARD_MASK;
    pub const MAX_REALM: i64 = REALM_MASK;
    pub const MAX_NUM: i64 = NUM_MASK;

    /// Packs the triple, rejecting any component outside its bit width.
    pub fn encode(shard: i64, realm: i64, num: i64) -> Result<Self, EntityIdError> {
        check("shard", shard, SHARD_MASK)?;
        check("realm", realm, REALM_MASK)?;
        check("num", num, NUM_MASK)?;
        Ok(Self(
            ((shard as u64) << (REALM_BITS + NUM_BITS)) | ((realm as u64) << NUM_BITS) | num as u64,
        ))
    }

    /// Wraps an already packed value read from a signed column or field.
    pub fn from_encoded(id: i64) -> Result<Self, EntityIdError> {
        if id < 0 {
            return Err(EntityIdError::NegativeEncoding(id));
        }
        Ok(Self(id as u64))
    }

    /// Wraps an already packed value.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Converts an id packed with the [`legacy`] layout.
    pub fn from_legacy(id: i64) -> Result<Self, EntityIdError> {
        let (shard, realm, num) = legacy::decode(id)?;
        Self::encode(shard, realm, num)
    }

    /// Parses `shard.realm.num`.
    pub fn parse(s: &str) -> Result<Self, EntityIdError> {
        let malformed = || EntityIdError::Malformed(s.to_string());
        let mut parts = s.split('.');
        let mut next = || -> Result<i64, EntityIdError> {
            let part = parts.next().ok_or_else(malformed)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<i64>().map_err(|_| malformed())
        };
        let shard = next()?;
        let realm = next()?;
        let num = next()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Self::encode(shard, realm, num)
    }

    /// The packed value.
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn shard(&self) -> i64 {
        ((self.0 >> (REALM_BITS + NUM_BITS)) as i64) & SHARD_MASK
    }

    pub fn realm(&self) -> i64 {
        ((self.0 >> NUM_BITS) as i64) & REALM_MASK
    }

    pub fn num(&self) -> i64 {
        (self.0 as i64) & NUM_MASK
    }

    /// Exact inverse of [`EntityId::encode`].
    pub fn decode(&self) -> (i64, i64, i64) {
        (self.shard(), self.realm(), self.num())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// `None` when this is the EMPTY sentinel.
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

fn check(component: &'static str, value: i64, max: i64) -> Result<(), EntityIdError> {
    if value < 0 || value > max {
        return Err(EntityIdError::InvalidEntityId {
            component,
            value,
            max,
        });
    }
    Ok(())
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard(), self.realm(), self.num())
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// LEGACY LAYOUT
// =============================================================================

/// The `shard (15) | realm (16) | num (32)` layout used by older streams.
pub mod legacy {
    use crate::errors::EntityIdError;

    const SHARD_BITS: u32 = 15;
    const REALM_BITS: u32 = 16;
    const NUM_BITS: u32 = 32;

    const SHARD_MASK: i64 = (1 << SHARD_BITS) - 1;
    const REALM_MASK: i64 = (1 << REALM_BITS) - 1;
    const NUM_MASK: i64 = (1 << NUM_BITS) - 1;

    pub fn encode(shard: i64, realm: i64, num: i64) -> Result<i64, EntityIdError> {
        super::check("shard", shard, SHARD_MASK)?;
        super::check("realm", realm, REALM_MASK)?;
        super::check("num", num, NUM_MASK)?;
        Ok((shard << (REALM_BITS + NUM_BITS)) | (realm << NUM_BITS) | num)
    }

    pub fn decode(id: i64) -> Result<(i64, i64, i64), EntityIdError> {
        if id < 0 {
            return Err(EntityIdError::NegativeEncoding(id));
        }
        Ok((
            (id >> (REALM_BITS + NUM_BITS)) & SHARD_MASK,
            (id >> NUM_BITS) & REALM_MASK,
            id & NUM_MASK,
        ))
    }
}

// =============================================================================
// BOUNDED CACHE
// =============================================================================

/// Default number of ids kept by [`EntityIdCache`].
pub const DEFAULT_CACHE_SIZE: usize = 100_000;

/// Thread-safe LRU of recently constructed ids keyed by their components.
///
/// Lookups return exactly what [`EntityId::encode`] would; the cache only
/// saves re-validation of hot ids.
pub struct EntityIdCache {
    inner: Mutex<LruCache<(i64, i64, i64), EntityId>>,
}

impl EntityIdCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached equivalent of [`EntityId::encode`].
    pub fn of(&self, shard: i64, realm: i64, num: i64) -> Result<EntityId, EntityIdError> {
        let key = (shard, realm, num);
        if let Some(id) = self.inner.lock().get(&key) {
            return Ok(*id);
        }
        let id = EntityId::encode(shard, realm, num)?;
        self.inner.lock().put(key, id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for EntityIdCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl fmt::Debug for EntityIdCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityIdCache")
            .field("len", &self.len())
            .finish()
    }
}
