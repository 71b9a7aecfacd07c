//! # ac-02-quorum-selection
//!
//! Pure, deterministic derivation of an epoch's quorum and leader order,
//! plus the majority arithmetic and signature counting every proof family
//! relies on.
//!
//! ## Overview
//!
//! - **Quorum**: fixed-size subset of the registry, seeded by the epoch hash
//! - **Leaders sequence**: full ordering of the registry for the leader role
//! - **Majority**: `floor(|quorum| / 2) + 1`
//! - **Attestations**: distinct quorum members whose Ed25519 signature over a
//!   canonical message verifies
//!
//! ## Determinism
//!
//! Every node must compute identical assignments without coordination.
//! The registry is sorted and deduplicated before shuffling, so the output
//! depends only on the set of validators and the epoch hash, never on the
//! order in which the registry was assembled.
//!
//! ```text
//! registry ──sort+dedup──→ shuffle(blake3("QUORUM:"  + epochHash)) ──take(n)──→ quorum
//!          └─────────────→ shuffle(blake3("LEADERS:" + epochHash)) ──────────→ leaders
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ac_02_quorum_selection::{derive_assignment, majority};
//!
//! let assignment = derive_assignment(&registry, &epoch_hash, params.quorum_size);
//! let needed = majority(assignment.quorum.len());
//! ```

pub mod domain;
pub mod error;

pub use domain::attestation::{
    count_verified_signatures, finalization_message, verify_afp, verify_afp_linkage,
};
pub use domain::selection::{
    derive_assignment, leaders_sequence, majority, select_quorum, EpochAssignment,
};
pub use domain::shuffle::{seed_from, shuffle_with_seed};
pub use error::{QuorumError, QuorumResult};
