//! # Validator Storage Cache
//!
//! In-memory copies of `<pubkey>_VALIDATOR_STORAGE` records. Entries are
//! flushed into the rotation batch and the cache is cleared after commit.

use parking_lot::RwLock;
use shared_types::{keys, BatchOperation, KVResult, Namespace, ValidatorId, ValidatorStorage};
use std::collections::HashMap;

#[derive(Default)]
pub struct ValidatorStorageCache {
    entries: RwLock<HashMap<ValidatorId, ValidatorStorage>>,
}

impl ValidatorStorageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pubkey: &ValidatorId) -> Option<ValidatorStorage> {
        self.entries.read().get(pubkey).cloned()
    }

    pub fn insert(&self, storage: ValidatorStorage) {
        self.entries.write().insert(storage.pubkey.clone(), storage);
    }

    /// Batch operations writing every cached entry back.
    pub fn flush_ops(&self) -> KVResult<Vec<BatchOperation>> {
        let entries = self.entries.read();
        let mut ops = Vec::with_capacity(entries.len());
        for (pubkey, storage) in entries.iter() {
            ops.push(BatchOperation::put_json(
                Namespace::ApprovementThread,
                keys::validator_storage(pubkey),
                storage,
            )?);
        }
        Ok(ops)
    }

    /// Invalidate everything.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
