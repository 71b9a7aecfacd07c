//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports owned by the subsystem
//! crates.
//!
//! ```text
//!   ac-01 BlockSource ─────┐
//!   ac-05 FinalizationPeer ┼──→ HttpPeerClient (reqwest)
//!   ac-06 RotationPeer ────┘
//!
//!   shared-types KeyValueStore ──→ RocksDbStore (feature "rocksdb")
//!                              └─→ InMemoryKVStore
//! ```

pub mod peer_client;
pub mod storage;

pub use peer_client::HttpPeerClient;
pub use storage::open_store;
