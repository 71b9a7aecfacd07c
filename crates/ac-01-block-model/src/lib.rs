//! # ac-01-block-model
//!
//! Blocks of an anchor's personal chain.
//!
//! ## Overview
//!
//! - **Canonical hash**: BLAKE3 over
//!   `creator:time:networkId:epochFullId:extraData:index:prevHash`
//! - **Signing**: Ed25519 over the hex hash, by the creator's key
//! - **Extra data**: tagged [`ExtraData`] union (free-form fields, proof
//!   bundles, delayed-transactions batch) with a canonical JSON encoding
//! - **Generation metadata**: the local proposer's chain position (`GT`)
//! - **Retrieval**: [`BlockFetcher`], local store first, then a concurrent
//!   race across quorum members and bootstrap nodes
//!
//! ## Block ids
//!
//! ```text
//! epoch index ──┐
//! creator ──────┼──→ "epoch:creator:index"  (Blocks namespace key)
//! index ────────┘
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::block::{epoch_index_from_full_id, Block};
pub use domain::extra_data::{BlockPayload, ExtraData};
pub use domain::metadata::GenerationMetadata;
pub use error::{BlockError, BlockResult};
pub use ports::outbound::BlockSource;
pub use service::{BlockFetcher, BlockFetcherConfig};
