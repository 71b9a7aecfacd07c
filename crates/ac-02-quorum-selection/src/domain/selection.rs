//! # Quorum and Leader Selection
//!
//! Pure functions of `(registry, epoch hash)`.

use super::shuffle::{seed_from, shuffle_with_seed};
use shared_types::ValidatorId;

const QUORUM_DOMAIN: &str = "QUORUM";
const LEADERS_DOMAIN: &str = "LEADERS";

/// Quorum and leader order of one epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochAssignment {
    pub quorum: Vec<ValidatorId>,
    pub leaders_sequence: Vec<ValidatorId>,
}

/// Minimum number of signatures for a quorum of `quorum_len` members.
pub fn majority(quorum_len: usize) -> usize {
    quorum_len / 2 + 1
}

fn canonical_registry(registry: &[ValidatorId]) -> Vec<ValidatorId> {
    let mut sorted: Vec<ValidatorId> = registry
        .iter()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect();
    sorted.sort();
    sorted.dedup();
    sorted
}

/// Select `quorum_size` members (or the whole registry if smaller).
pub fn select_quorum(
    registry: &[ValidatorId],
    epoch_hash: &str,
    quorum_size: usize,
) -> Vec<ValidatorId> {
    let canonical = canonical_registry(registry);
    let mut shuffled = shuffle_with_seed(&canonical, &seed_from(QUORUM_DOMAIN, epoch_hash));
    shuffled.truncate(quorum_size);
    shuffled
}

/// Full ordering of the registry for the leader role.
pub fn leaders_sequence(registry: &[ValidatorId], epoch_hash: &str) -> Vec<ValidatorId> {
    let canonical = canonical_registry(registry);
    shuffle_with_seed(&canonical, &seed_from(LEADERS_DOMAIN, epoch_hash))
}

/// Quorum and leader order in one call.
pub fn derive_assignment(
    registry: &[ValidatorId],
    epoch_hash: &str,
    quorum_size: usize,
) -> EpochAssignment {
    EpochAssignment {
        quorum: select_quorum(registry, epoch_hash, quorum_size),
        leaders_sequence: leaders_sequence(registry, epoch_hash),
    }
}
