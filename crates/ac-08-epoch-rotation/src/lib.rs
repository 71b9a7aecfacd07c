//! # ac-08-epoch-rotation
//!
//! Moves the node from one epoch to the next.
//!
//! ## State Machine
//!
//! ```text
//!   fresh ──window elapsed──→ expired ──EPOCH_FINISH:<id>──→ flagged
//!     ↑                                                        │
//!     │                                     first block resolved?
//!     │                                                        │
//!     └──── install root ←── atomic batch ←── write_paused ────┘
//! ```
//!
//! The finish marker is an idempotent write and needs no lock. Rotation
//! closes the routes gate, takes the exclusive root lock and commits, in
//! one batch:
//!
//! - `EPOCH_HANDLER:<id>` of the outgoing epoch
//! - every cached `<pubkey>_VALIDATOR_STORAGE`
//! - `EPOCH_DATA:<id+1>` and `EPOCH_HANDLER:<id+1>`
//! - the new `AT`
//! - `LATEST_BATCH_INDEX` when a delayed batch was executed
//!
//! A failed commit is fatal ([`EpochRotationError::BatchCommit`]); every
//! other failure is retried on the next tick.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::delayed::{
    partition_delayed_transactions, verify_delayed_batch, BatchVerdict, DelayedPartition,
    VOTING_ACCEPT,
};
pub use domain::next_epoch::{next_epoch, next_epoch_data, next_epoch_hash};
pub use error::{EpochRotationError, EpochRotationResult};
pub use service::{EpochRotation, FirstBlock, TickOutcome};
