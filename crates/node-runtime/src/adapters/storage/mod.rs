//! # Storage Adapters
//!
//! Enable the `rocksdb` feature for the persistent backend:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```
//!
//! Without it the node runs on `InMemoryKVStore` and forgets everything on
//! exit.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::container::config::StorageConfig;
use anyhow::Result;
use shared_types::KeyValueStore;
use std::sync::Arc;

/// Open the store selected at build time.
#[cfg(feature = "rocksdb")]
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    use anyhow::Context;

    let store = RocksDbStore::open(RocksDbConfig::new(&config.chaindata_path)).with_context(|| {
        format!("Failed to open chaindata at {}", config.chaindata_path.display())
    })?;
    tracing::info!(path = %config.chaindata_path.display(), "RocksDB chaindata opened");
    Ok(Arc::new(store))
}

/// Open the store selected at build time.
#[cfg(not(feature = "rocksdb"))]
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    tracing::warn!(
        path = %config.chaindata_path.display(),
        "Built without the rocksdb feature; state is kept in memory only"
    );
    Ok(Arc::new(shared_types::InMemoryKVStore::new()))
}
