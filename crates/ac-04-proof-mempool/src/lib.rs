//! # ac-04-proof-mempool
//!
//! Holding area for quorum-attested proofs between acceptance and block
//! inclusion.
//!
//! ## Overview
//!
//! - [`ProofMempool`]: keyed by `epoch:subject:votingIndex`, last write wins,
//!   `drain` swaps the whole map out
//! - [`AggregatedProof`]: common view over anchor-rotation and
//!   leader-finalization proofs
//! - [`ProofAcceptor`]: store-then-mempool acceptance, parameterized by a
//!   [`ValidationPolicy`]
//! - [`ProofPools`]: both mempools, drained into a block's [`ExtraData`]
//!
//! [`ExtraData`]: ac_01_block_model::ExtraData

pub mod domain;
pub mod error;
pub mod service;

pub use domain::mempool::ProofMempool;
pub use domain::policy::ValidationPolicy;
pub use domain::proof::AggregatedProof;
pub use error::{ProofError, ProofResult};
pub use service::{AcceptOutcome, ProofAcceptor, ProofPools};
