//! # ac-07-leader-finalization
//!
//! Acceptance path for leader-finalization proofs.
//!
//! Shares the store-then-mempool mechanics of anchor-rotation proofs
//! ([`ProofAcceptor`]) but plugs in [`PresenceOnlyPolicy`]: a well-formed
//! voting stat and a non-empty signature map are enough. Quorum membership
//! and majority are not checked. The service is generic over the policy so
//! a stricter one can be swapped in without touching the acceptance path.
//!
//! [`ProofAcceptor`]: ac_04_proof_mempool::ProofAcceptor

pub mod domain;
pub mod service;

pub use domain::messages::AcceptLeaderFinalizationRequest;
pub use domain::policy::PresenceOnlyPolicy;
pub use service::LeaderFinalizationService;
