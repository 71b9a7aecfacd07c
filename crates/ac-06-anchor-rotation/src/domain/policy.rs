//! # Strict Quorum Policy
//!
//! Acceptance rules for anchor-rotation proofs:
//!
//! 1. epoch tracked, creator in its registry, at least `majority` raw
//!    signatures (before the lock)
//! 2. voting stat non-empty; its AFP certifies `epoch:creator:index` with
//!    the stat hash and verifies against the quorum
//! 3. at least `majority` distinct quorum members signed the rotation
//!    message
//!
//! A validated proof's voting stat is adopted locally.

use super::messages::rotation_message;
use ac_02_quorum_selection::{count_verified_signatures, majority, verify_afp_linkage};
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::{ProofError, ProofResult, ValidationPolicy};
use shared_types::{AnchorRotationProof, BlockId, EpochDataHandler};
use std::sync::Arc;

pub struct StrictQuorumPolicy {
    state: Arc<EpochState>,
}

impl StrictQuorumPolicy {
    pub fn new(state: Arc<EpochState>) -> Self {
        Self { state }
    }

    fn epoch_of(&self, proof: &AnchorRotationProof) -> ProofResult<EpochDataHandler> {
        let epoch = self
            .state
            .tracked_epoch(proof.epoch_index)
            .ok_or(ProofError::UntrackedEpoch(proof.epoch_index))?;
        if !epoch.in_registry(&proof.creator) {
            return Err(ProofError::UnknownSubject {
                epoch: proof.epoch_index,
                subject: proof.creator.clone(),
            });
        }
        Ok(epoch)
    }
}

impl ValidationPolicy<AnchorRotationProof> for StrictQuorumPolicy {
    fn precheck(&self, proof: &AnchorRotationProof) -> ProofResult<()> {
        let epoch = self.epoch_of(proof)?;
        let need = majority(epoch.quorum.len());
        if proof.signatures.len() < need {
            return Err(ProofError::InsufficientSignatures {
                have: proof.signatures.len(),
                need,
            });
        }
        Ok(())
    }

    fn validate(&self, proof: &AnchorRotationProof) -> ProofResult<()> {
        let epoch = self.epoch_of(proof)?;
        let stat = &proof.voting_stat;
        if stat.index < 0 || stat.hash.is_empty() {
            return Err(ProofError::InvalidVotingStat);
        }

        let epoch_full_id = epoch.full_id();
        let block_id = BlockId::new(epoch.id, proof.creator.clone(), stat.index as u64);
        verify_afp_linkage(
            &stat.afp,
            &block_id.to_string(),
            Some(&stat.hash),
            &epoch_full_id,
            &epoch.quorum,
        )?;

        let message = rotation_message(epoch.id, &proof.creator, stat, &epoch_full_id);
        let have = count_verified_signatures(&message, &proof.signatures, &epoch.quorum);
        let need = majority(epoch.quorum.len());
        if have < need {
            return Err(ProofError::InsufficientSignatures { have, need });
        }
        Ok(())
    }

    fn on_validated(&self, proof: &AnchorRotationProof) -> ProofResult<()> {
        self.state
            .store_voting_stat(proof.epoch_index, &proof.creator, &proof.voting_stat)?;
        Ok(())
    }
}
