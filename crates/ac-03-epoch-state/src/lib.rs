//! # ac-03-epoch-state
//!
//! Process-wide consensus root and the per-epoch records around it.
//!
//! ## Overview
//!
//! - **Root**: `ApprovementThreadMetadataHandler` (parameters + current
//!   epoch) behind one `parking_lot::RwLock`
//! - **Routes gate**: advisory flag that stops new transport readers while
//!   the rotation thread waits for the write lock
//! - **Tracked epochs**: current and previous epoch snapshots
//! - **Validator cache**: read-through `ValidatorStorage` records, flushed
//!   into the rotation batch
//! - **Records**: finish markers, health flags, monotonic voting stats
//! - **Locks**: async mutex per `(epoch, validator)` for peer rounds, plus a
//!   synchronous one around every voting-stat read-check-write
//!
//! ## Lock Discipline
//!
//! ```text
//! transport handler ──routes open?──→ read()  ──→ respond
//! rotation thread   ──pause routes──→ write() ──→ commit batch ──→ install ──→ resume
//! ```
//!
//! Per-validator async locks are always taken before the root read lock and
//! never while holding the root write lock.

pub mod domain;
pub mod error;
pub mod service;

/// Deterministic validator sets for tests.
///
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use domain::cache::ValidatorStorageCache;
pub use domain::genesis::Genesis;
pub use domain::locks::{StatLocks, ValidatorLocks};
pub use domain::routes::{RoutesGate, RoutesPause};
pub use error::{EpochStateError, EpochStateResult};
pub use service::{EpochState, RootWriter};
