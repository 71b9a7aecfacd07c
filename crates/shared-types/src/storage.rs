//! # Storage Port
//!
//! Abstract interface for the node's key-value database.
//!
//! Production: `RocksDbStore` (node-runtime/adapters/storage/rocksdb_adapter.rs),
//! one column family per [`Namespace`].
//! Testing: [`InMemoryKVStore`] (below).
//!
//! ## Atomicity
//!
//! `atomic_batch_write` applies every operation or none, and a batch may span
//! namespaces. Epoch rotation and finalization acceptance depend on this.

use crate::errors::{KVResult, KVStoreError};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Logical key spaces of the node database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Blocks by id, plus the genesis-tracker record.
    Blocks,
    /// Application state touched by delayed operations.
    State,
    /// AFPs, epoch snapshots and first-block assumptions.
    EpochData,
    /// Approvement-thread root, next-epoch data and validator records.
    ApprovementThread,
    /// Voting stats, health flags and accepted proof bundles.
    FinalizationVotingStats,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Blocks,
        Namespace::State,
        Namespace::EpochData,
        Namespace::ApprovementThread,
        Namespace::FinalizationVotingStats,
    ];

    /// Column family / directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Blocks => "blocks",
            Namespace::State => "state",
            Namespace::EpochData => "epoch_data",
            Namespace::ApprovementThread => "approvement_thread",
            Namespace::FinalizationVotingStats => "finalization_voting_stats",
        }
    }
}

/// Abstract interface for key-value database operations.
///
/// Methods take `&self`; backends synchronize internally so the store can
/// be shared behind an `Arc` by every subsystem.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, ns: Namespace, key: &str) -> KVResult<Option<Vec<u8>>>;

    /// Put a single key-value pair.
    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> KVResult<()>;

    /// Delete a key.
    fn delete(&self, ns: Namespace, key: &str) -> KVResult<()>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()>;

    /// Check if a key exists.
    fn exists(&self, ns: Namespace, key: &str) -> KVResult<bool> {
        Ok(self.get(ns, key)?.is_some())
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        ns: Namespace,
        key: String,
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete { ns: Namespace, key: String },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(ns: Namespace, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            ns,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Put operation with a JSON-encoded value.
    pub fn put_json<T: Serialize>(ns: Namespace, key: impl Into<String>, value: &T) -> KVResult<Self> {
        let key = key.into();
        let value = serde_json::to_vec(value).map_err(|e| KVStoreError::Serialization {
            key: key.clone(),
            message: e.to_string(),
        })?;
        Ok(BatchOperation::Put { ns, key, value })
    }

    /// Create a Delete operation.
    pub fn delete(ns: Namespace, key: impl Into<String>) -> Self {
        BatchOperation::Delete {
            ns,
            key: key.into(),
        }
    }
}

/// JSON helpers over any `KeyValueStore`.
pub trait JsonStoreExt {
    /// Read and decode a JSON value. Undecodable values are reported as
    /// `KVStoreError::Serialization`.
    fn get_json<T: DeserializeOwned>(&self, ns: Namespace, key: &str) -> KVResult<Option<T>>;

    /// Encode and write a JSON value.
    fn put_json<T: Serialize>(&self, ns: Namespace, key: &str, value: &T) -> KVResult<()>;
}

impl<S: KeyValueStore + ?Sized> JsonStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, ns: Namespace, key: &str) -> KVResult<Option<T>> {
        match self.get(ns, key)? {
            Some(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| KVStoreError::Serialization {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, ns: Namespace, key: &str, value: &T) -> KVResult<()> {
        let raw = serde_json::to_vec(value).map_err(|e| KVStoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.put(ns, key, &raw)
    }
}

/// In-memory key-value store for testing.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<HashMap<Namespace, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored in a namespace.
    pub fn len(&self, ns: Namespace) -> usize {
        self.data.read().get(&ns).map(|m| m.len()).unwrap_or(0)
    }

    /// Keys of a namespace in lexicographic order.
    pub fn keys(&self, ns: Namespace) -> Vec<String> {
        self.data
            .read()
            .get(&ns)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, ns: Namespace, key: &str) -> KVResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(&ns).and_then(|m| m.get(key).cloned()))
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> KVResult<()> {
        self.data
            .write()
            .entry(ns)
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> KVResult<()> {
        if let Some(m) = self.data.write().get_mut(&ns) {
            m.remove(key);
        }
        Ok(())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> KVResult<()> {
        // One write guard for the whole batch.
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { ns, key, value } => {
                    data.entry(ns).or_default().insert(key, value);
                }
                BatchOperation::Delete { ns, key } => {
                    if let Some(m) = data.get_mut(&ns) {
                        m.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
