//! # Shared Types Crate
//!
//! Entities, identifiers and the storage port used across the anchor
//! subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every record that is persisted or sent to a
//!   peer is defined here, with its JSON (camelCase) shape.
//! - **Namespaced Storage**: five logical key spaces behind one
//!   `KeyValueStore` port, so a single batch may span namespaces atomically.
//! - **ASCII Keys**: storage keys are built only through `keys`, never
//!   formatted ad hoc in subsystems.

pub mod entities;
pub mod errors;
pub mod ids;
pub mod keys;
pub mod storage;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use ids::{BlockId, ValidatorId};
pub use storage::{BatchOperation, InMemoryKVStore, JsonStoreExt, KeyValueStore, Namespace};
