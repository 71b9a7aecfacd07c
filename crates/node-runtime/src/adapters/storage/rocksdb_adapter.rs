//! # RocksDB Storage Adapter
//!
//! Production implementation of the `KeyValueStore` port.
//!
//! ## Column Families
//!
//! One per `Namespace`: `blocks`, `state`, `epoch_data`,
//! `approvement_thread`, `finalization_voting_stats`. A batch spanning
//! namespaces is a single `WriteBatch`, so it is atomic across families.

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, WriteBatch, WriteOptions, DB};
use shared_types::{BatchOperation, KVResult, KVStoreError, KeyValueStore, Namespace};
use std::path::PathBuf;

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    pub path: PathBuf,
    /// Block cache size in bytes (default: 128MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 64MB)
    pub write_buffer_size: usize,
    /// fsync after each write
    pub sync_writes: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 128 * 1024 * 1024,
            write_buffer_size: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }

    /// Small buffers, no sync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create the database with every namespace column family.
    pub fn open(config: RocksDbConfig) -> KVResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = Namespace::ALL
            .iter()
            .map(|ns| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(ns.as_str(), cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| KVStoreError::io(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self { db, config })
    }

    fn cf(&self, ns: Namespace) -> KVResult<&ColumnFamily> {
        self.db
            .cf_handle(ns.as_str())
            .ok_or_else(|| KVStoreError::CorruptionError {
                message: format!("Missing column family {}", ns.as_str()),
            })
    }

    fn write_options(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, ns: Namespace, key: &str) -> KVResult<Option<Vec<u8>>> {
        self.db
            .get_cf(self.cf(ns)?, key.as_bytes())
            .map_err(|e| KVStoreError::io(format!("RocksDB get failed: {e}")))
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> KVResult<()> {
        self.db
            .put_cf_opt(self.cf(ns)?, key.as_bytes(), value, &self.write_options())
            .map_err(|e| KVStoreError::io(format!("RocksDB put failed: {e}")))
    }

    fn delete(&self, ns: Namespace, key: &str) -> KVResult<()> {
        self.db
            .delete_cf_opt(self.cf(ns)?, key.as_bytes(), &self.write_options())
            .map_err(|e| KVStoreError::io(format!("RocksDB delete failed: {e}")))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { ns, key, value } => {
                    batch.put_cf(self.cf(ns)?, key.as_bytes(), &value);
                }
                BatchOperation::Delete { ns, key } => {
                    batch.delete_cf(self.cf(ns)?, key.as_bytes());
                }
            }
        }

        self.db
            .write_opt(batch, &self.write_options())
            .map_err(|e| KVStoreError::BatchCommit {
                message: format!("RocksDB batch write failed: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::JsonStoreExt;
    use tempfile::TempDir;

    #[test]
    fn test_rocksdb_namespaces_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksDbStore::open(RocksDbConfig::for_testing(temp_dir.path())).unwrap();

        store.put(Namespace::Blocks, "k", b"block").unwrap();
        store.put(Namespace::State, "k", b"state").unwrap();
        assert_eq!(store.get(Namespace::Blocks, "k").unwrap(), Some(b"block".to_vec()));
        assert_eq!(store.get(Namespace::State, "k").unwrap(), Some(b"state".to_vec()));
        assert!(!store.exists(Namespace::EpochData, "k").unwrap());

        store.delete(Namespace::Blocks, "k").unwrap();
        assert!(!store.exists(Namespace::Blocks, "k").unwrap());
        assert!(store.exists(Namespace::State, "k").unwrap());
    }

    #[test]
    fn test_rocksdb_batch_spans_namespaces() {
        let temp_dir = TempDir::new().unwrap();
        let store = RocksDbStore::open(RocksDbConfig::for_testing(temp_dir.path())).unwrap();
        store.put(Namespace::EpochData, "gone", b"x").unwrap();

        store
            .atomic_batch_write(vec![
                BatchOperation::put(Namespace::ApprovementThread, "AT", b"root".to_vec()),
                BatchOperation::put(Namespace::FinalizationVotingStats, "0:a", b"stat".to_vec()),
                BatchOperation::delete(Namespace::EpochData, "gone"),
            ])
            .unwrap();

        assert!(store.exists(Namespace::ApprovementThread, "AT").unwrap());
        assert!(store.exists(Namespace::FinalizationVotingStats, "0:a").unwrap());
        assert!(!store.exists(Namespace::EpochData, "gone").unwrap());
    }

    #[test]
    fn test_rocksdb_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = RocksDbStore::open(RocksDbConfig::for_testing(temp_dir.path())).unwrap();
            store.put_json(Namespace::State, "LATEST_BATCH_INDEX", &3u64).unwrap();
        }
        let store = RocksDbStore::open(RocksDbConfig::for_testing(temp_dir.path())).unwrap();
        let latest: Option<u64> = store.get_json(Namespace::State, "LATEST_BATCH_INDEX").unwrap();
        assert_eq!(latest, Some(3));
    }
}
