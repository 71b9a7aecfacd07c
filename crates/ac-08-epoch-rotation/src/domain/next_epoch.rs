//! # Next Epoch Derivation
//!
//! The next epoch keeps the registry, starts exactly one window after the
//! current one and draws its quorum and leader order from a new hash.

use ac_02_quorum_selection::derive_assignment;
use shared_crypto::blake3_hex;
use shared_types::{EpochDataHandler, NetworkParameters, NextEpochDataHandler};

/// `blake3(firstBlockHash)` when the first block was confirmed, else
/// `blake3(previousEpochHash)`.
pub fn next_epoch_hash(current: &EpochDataHandler, first_block_hash: Option<&str>) -> String {
    blake3_hex(first_block_hash.unwrap_or(&current.hash))
}

/// Handler of epoch `current.id + 1`.
pub fn next_epoch(
    current: &EpochDataHandler,
    params: &NetworkParameters,
    first_block_hash: Option<&str>,
) -> EpochDataHandler {
    let hash = next_epoch_hash(current, first_block_hash);
    let assignment = derive_assignment(&current.validators_registry, &hash, params.quorum_size);

    EpochDataHandler {
        id: current.id + 1,
        hash,
        validators_registry: current.validators_registry.clone(),
        quorum: assignment.quorum,
        leaders_sequence: assignment.leaders_sequence,
        current_leader_index: 0,
        start_timestamp: current.start_timestamp.saturating_add(params.epoch_duration),
    }
}

/// `EPOCH_DATA:<id>` record of a derived epoch.
pub fn next_epoch_data(epoch: &EpochDataHandler) -> NextEpochDataHandler {
    NextEpochDataHandler {
        next_epoch_hash: epoch.hash.clone(),
        next_epoch_validators_registry: epoch.validators_registry.clone(),
        next_epoch_quorum: epoch.quorum.clone(),
        next_epoch_leaders_sequence: epoch.leaders_sequence.clone(),
    }
}
