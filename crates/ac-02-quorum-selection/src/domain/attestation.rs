//! # Attestation Counting
//!
//! An attestation counts when its signer is a quorum member and the
//! signature verifies over the canonical message. Signatures are keyed by
//! signer, so every signer counts at most once.

use super::selection::majority;
use crate::error::{QuorumError, QuorumResult};
use rayon::prelude::*;
use shared_crypto::verify_hex;
use shared_types::{AggregatedFinalizationProof, SignatureMap, ValidatorId};
use tracing::debug;

/// Canonical finalization message `prevBlockHash:blockId:blockHash:epochFullId`.
pub fn finalization_message(
    prev_block_hash: &str,
    block_id: &str,
    block_hash: &str,
    epoch_full_id: &str,
) -> String {
    format!("{prev_block_hash}:{block_id}:{block_hash}:{epoch_full_id}")
}

/// Number of distinct quorum members whose signature over `message` verifies.
pub fn count_verified_signatures(
    message: &str,
    signatures: &SignatureMap,
    quorum: &[ValidatorId],
) -> usize {
    let candidates: Vec<(&ValidatorId, &String)> = signatures
        .iter()
        .filter(|(voter, sig)| !sig.is_empty() && quorum.contains(voter))
        .collect();

    candidates
        .par_iter()
        .filter(|(voter, sig)| verify_hex(message, voter.as_str(), sig))
        .count()
}

/// Verify an AFP against the quorum of the epoch it was produced in.
pub fn verify_afp(
    afp: &AggregatedFinalizationProof,
    epoch_full_id: &str,
    quorum: &[ValidatorId],
) -> QuorumResult<()> {
    if quorum.is_empty() {
        return Err(QuorumError::EmptyQuorum);
    }
    let need = majority(quorum.len());
    if afp.proofs.len() < need {
        return Err(QuorumError::InsufficientAttestations {
            have: afp.proofs.len(),
            need,
        });
    }

    let message = finalization_message(
        &afp.prev_block_hash,
        &afp.block_id,
        &afp.block_hash,
        epoch_full_id,
    );
    let have = count_verified_signatures(&message, &afp.proofs, quorum);
    if have < need {
        debug!(
            block_id = %afp.block_id,
            have, need, "[ac-02] AFP below majority"
        );
        return Err(QuorumError::InsufficientAttestations { have, need });
    }
    Ok(())
}

/// Verify an AFP and that it certifies `expected_block_id` with
/// `expected_hash` (case-insensitive).
pub fn verify_afp_linkage(
    afp: &AggregatedFinalizationProof,
    expected_block_id: &str,
    expected_hash: Option<&str>,
    epoch_full_id: &str,
    quorum: &[ValidatorId],
) -> QuorumResult<()> {
    if !afp.block_id.eq_ignore_ascii_case(expected_block_id) {
        return Err(QuorumError::BlockIdMismatch {
            expected: expected_block_id.to_string(),
            actual: afp.block_id.clone(),
        });
    }
    if let Some(hash) = expected_hash {
        if !afp.block_hash.eq_ignore_ascii_case(hash) {
            return Err(QuorumError::BlockHashMismatch {
                block_id: afp.block_id.clone(),
            });
        }
    }
    verify_afp(afp, epoch_full_id, quorum)
}
