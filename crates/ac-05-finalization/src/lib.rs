//! # ac-05-finalization
//!
//! Per-block finalization protocol: a quorum majority signs
//! `prevBlockHash:blockId:blockHash:epochFullId` and the signatures are
//! aggregated into an AFP that chains each block to its predecessor.
//!
//! ## Overview
//!
//! - [`FinalizationService`]: acceptor side. Verifies a proposed block and
//!   the AFP of its predecessor, commits block + previous AFP + voting stat
//!   in one atomic batch, then signs.
//! - [`BlockProposer`]: proposer side. Builds the next own block from the
//!   drained mempools, persists it with the advanced `GT`, fans out to the
//!   quorum and stores `AFP:<blockId>` at majority.
//! - Lookups: block plus the AFP of the next block, and plain AFP reads.
//!
//! ## Locking
//!
//! ```text
//! request(e, c1) ──→ stat_lock(e, c1) ──→ verify ──→ batch ──→ unlock ──→ sign
//! request(e, c2) ──→ stat_lock(e, c2) ──→ ...            (independent of c1)
//! ```
//!
//! The stat lock comes from `EpochState`, so rotation-proof paths updating
//! the same creator's voting stat wait for the commit. Only the first-block
//! assumption write of an epoch is serialized across creators.
//!
//! ## Segment Continuity
//!
//! The local voting stat of a creator records the last block proven final
//! (index, hash, AFP). A request for block `n` is accepted when the stat is
//! below `n`, or equal to `n` with the same hash (a repeated request for the
//! same block). Accepting block `n > 0` moves the stat to `n - 1`.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::messages::{BlockWithAfp, FinalizationRequest, FinalizationVote};
pub use error::{FinalizationError, FinalizationResult};
pub use ports::outbound::FinalizationPeer;
pub use service::{BlockProposer, FinalizationService, ProposerConfig};
