//! # Anchors Node Runtime Library
//!
//! Process wiring of the anchors consensus core: configuration, genesis
//! loading, storage and transport adapters, and the node container. The
//! binary in `main.rs` only installs logging and drives the container.

pub mod adapters;
pub mod container;
pub mod genesis;

pub use container::{load_config, AnchorsNode, NodeConfig, Peers};
pub use genesis::load_genesis;
