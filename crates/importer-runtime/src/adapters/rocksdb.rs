//! # RocksDB Storage Adapter
//!
//! RocksDB implementation of the persistence [`KeyValueStore`].
//!
//! ## Features
//!
//! - Atomic batch writes (WriteBatch), one per committed stream file
//! - Snappy compression
//! - Bloom filters for point lookups of current rows
//! - Ordered iteration for prefix and range scans
//!
//! Keys are laid out so that byte order is consensus order within a table,
//! which is what retention and history folding rely on.

use mn_06_persistence::{BatchOperation, KVStoreError, KeyValueStore};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 256MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 64MB)
    pub write_buffer_size: usize,
    /// Maximum number of write buffers (default: 3)
    pub max_write_buffer_number: i32,
    /// Target file size for level-1 (default: 64MB)
    pub target_file_size_base: u64,
    /// fsync after each write (default: true)
    pub sync_writes: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 256 * 1024 * 1024,
            write_buffer_size: 64 * 1024 * 1024,
            max_write_buffer_number: 3,
            target_file_size_base: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }

    /// Smaller buffers, no sync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            max_write_buffer_number: 2,
            target_file_size_base: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

fn io_error(operation: &str, e: rocksdb::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("RocksDB {operation} failed: {e}"),
    }
}

impl RocksDbStore {
    /// Opens or creates the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_target_file_size_base(config.target_file_size_base);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB at {}: {e}", config.path.display()),
        })?;
        Ok(Self { db, config })
    }

    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        Self::open(RocksDbConfig::new(path.as_ref()))
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    /// Forward scan from `start` while `keep` accepts the key.
    fn scan_from(
        &self,
        start: &[u8],
        keep: impl Fn(&[u8]) -> bool,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut results = Vec::new();
        for item in self.db.iterator(IteratorMode::From(start, Direction::Forward)) {
            let (key, value) = item.map_err(|e| io_error("scan", e))?;
            if !keep(&key) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(|e| io_error("get", e))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .put_opt(key, value, &self.write_options())
            .map_err(|e| io_error("put", e))
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .delete_opt(key, &self.write_options())
            .map_err(|e| io_error("delete", e))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }
        self.db
            .write_opt(batch, &self.write_options())
            .map_err(|e| io_error("batch write", e))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.db
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| io_error("exists check", e))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        self.scan_from(prefix, |key| key.starts_with(prefix))
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        if start >= end {
            return Ok(Vec::new());
        }
        self.scan_from(start, |key| key < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, RocksDbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksDbStore::open(RocksDbConfig::for_testing(dir.path().join("db"))).unwrap();
        (dir, store)
    }

    #[test]
    fn test_basic_operations() {
        let (_dir, store) = open();
        store.put(b"key1", b"value1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert!(store.exists(b"key1").unwrap());

        store.delete(b"key1").unwrap();
        assert!(!store.exists(b"key1").unwrap());
    }

    #[test]
    fn test_batch_and_scans() {
        let (_dir, store) = open();
        store.put(b"gone", b"x").unwrap();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"entity/0003".to_vec(), b"c".to_vec()),
                BatchOperation::put(b"entity/0001".to_vec(), b"a".to_vec()),
                BatchOperation::put(b"entity/0002".to_vec(), b"b".to_vec()),
                BatchOperation::put(b"token/0001".to_vec(), b"t".to_vec()),
                BatchOperation::delete(b"gone".to_vec()),
            ])
            .unwrap();

        assert!(!store.exists(b"gone").unwrap());
        let values: Vec<_> = store
            .prefix_scan(b"entity/")
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

        let range = store.range_scan(b"entity/0002", b"token/").unwrap();
        assert_eq!(range.len(), 2);
        assert!(store.range_scan(b"z", b"a").unwrap().is_empty());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = RocksDbConfig::for_testing(dir.path().join("db"));
        {
            let store = RocksDbStore::open(config.clone()).unwrap();
            store.put(b"cursor", b"42").unwrap();
        }
        let store = RocksDbStore::open(config).unwrap();
        assert_eq!(store.get(b"cursor").unwrap(), Some(b"42".to_vec()));
    }
}
