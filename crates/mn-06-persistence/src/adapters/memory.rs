//! In-memory key-value store for tests and single-process runs.

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Ordered map behind a lock. A batch holds the write lock for its whole
/// application, so readers never observe half of it.
#[derive(Debug, Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Every key, for assertions.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .read()
            .keys()
            .map(|key| String::from_utf8_lossy(key).into_owned())
            .collect()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        Ok(self
            .data
            .read()
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self
            .data
            .read()
            .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = InMemoryKVStore::new();
        store.put(b"key1", b"value1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert!(store.exists(b"key1").unwrap());

        store.delete(b"key1").unwrap();
        assert!(!store.exists(b"key1").unwrap());
    }

    #[test]
    fn test_batch_write() {
        let store = InMemoryKVStore::new();
        store.put(b"gone", b"x").unwrap();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"batch1".to_vec(), b"value1".to_vec()),
                BatchOperation::put(b"batch2".to_vec(), b"value2".to_vec()),
                BatchOperation::delete(b"gone".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.keys(), vec!["batch1", "batch2"]);
    }

    #[test]
    fn test_scans_are_ordered() {
        let store = InMemoryKVStore::new();
        store.put(b"block/0003", b"c").unwrap();
        store.put(b"block/0001", b"a").unwrap();
        store.put(b"block/0002", b"b").unwrap();
        store.put(b"tx/0001", b"t").unwrap();

        let values: Vec<_> = store
            .prefix_scan(b"block/")
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

        let range = store.range_scan(b"block/0002", b"block/0003").unwrap();
        assert_eq!(range.len(), 1);
        assert!(store.range_scan(b"z", b"a").unwrap().is_empty());
    }
}
