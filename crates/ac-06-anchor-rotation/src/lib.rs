//! # ac-06-anchor-rotation
//!
//! Majority-attested hand-off of a stalled anchor.
//!
//! ## Overview
//!
//! ```text
//! LivenessMonitor ──stat not advancing──→ BLOCK_CREATOR_HEALTH flag
//!                                              │
//! RotationCollector ──flag set, no proof──→ request signatures from quorum
//!        │                                     │
//!        │                    RotationService::respond (on every peer)
//!        │                                     │
//!        └── majority ──→ store + mempool ──→ broadcast accept_extra_data
//!                                              │
//!                        RotationService::accept_rotation_proofs
//!                        (StrictQuorumPolicy via ProofAcceptor)
//! ```
//!
//! Every step touching one creator runs under the `(epoch, creator)` lock of
//! the epoch state.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::messages::{
    rotation_message, AcceptRotationProofsRequest, AcceptedProofs, AnchorRotationProofRequest,
    AnchorRotationProofResponse, RotationStatus,
};
pub use domain::policy::StrictQuorumPolicy;
pub use error::{RotationError, RotationResult};
pub use ports::outbound::RotationPeer;
pub use service::{CollectorConfig, LivenessMonitor, RotationCollector, RotationService};
