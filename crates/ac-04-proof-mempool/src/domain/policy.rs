//! # Validation Policy
//!
//! The acceptor's only variable part. Anchor-rotation proofs use a strict
//! quorum-majority policy; leader-finalization proofs check presence only.

use super::proof::AggregatedProof;
use crate::error::ProofResult;

pub trait ValidationPolicy<P: AggregatedProof>: Send + Sync {
    /// Cheap checks run before the per-validator lock is taken.
    fn precheck(&self, _proof: &P) -> ProofResult<()> {
        Ok(())
    }

    /// Full validation, under the per-validator lock.
    fn validate(&self, proof: &P) -> ProofResult<()>;

    /// Side effects of a validated proof, before the dedup check.
    fn on_validated(&self, _proof: &P) -> ProofResult<()> {
        Ok(())
    }
}
