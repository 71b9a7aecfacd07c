//! Presence-only validation of leader-finalization proofs.

use ac_04_proof_mempool::{ProofError, ProofResult, ValidationPolicy};
use shared_types::LeaderFinalizationProof;

#[derive(Clone, Copy, Debug, Default)]
pub struct PresenceOnlyPolicy;

impl ValidationPolicy<LeaderFinalizationProof> for PresenceOnlyPolicy {
    fn precheck(&self, proof: &LeaderFinalizationProof) -> ProofResult<()> {
        let stat = &proof.voting_stat;
        if stat.index < 0 || stat.hash.is_empty() {
            return Err(ProofError::InvalidVotingStat);
        }
        if proof.signatures.is_empty() {
            return Err(ProofError::MissingSignatures);
        }
        Ok(())
    }

    fn validate(&self, _proof: &LeaderFinalizationProof) -> ProofResult<()> {
        Ok(())
    }
}
