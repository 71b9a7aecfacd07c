//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Finality**: `AggregatedFinalizationProof`, `VotingStat`
//! - **Proof bundles**: `AnchorRotationProof`, `LeaderFinalizationProof`
//! - **Governance**: `NetworkParameters`, `EpochDataHandler`,
//!   `ApprovementThreadMetadataHandler`, `NextEpochDataHandler`
//! - **Registry**: `ValidatorStorage`, `QuorumMember`
//! - **Epoch bookkeeping**: `FirstBlockAssumption`, `DelayedTransactionsBatch`,
//!   `BlockCreatorHealthStatus`
//!
//! All records serialize as camelCase JSON; that is both the wire and the
//! storage encoding.

use crate::ids::ValidatorId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder hash used before a segment has a real predecessor.
pub const ZERO_HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Signatures keyed by signer. `BTreeMap` keeps encodings canonical.
pub type SignatureMap = BTreeMap<ValidatorId, String>;

// =============================================================================
// FINALITY
// =============================================================================

/// Quorum attestation that a specific block is final.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedFinalizationProof {
    pub prev_block_hash: String,
    pub block_id: String,
    pub block_hash: String,
    #[serde(default)]
    pub proofs: SignatureMap,
}

/// Latest finalized position known for a creator.
///
/// Monotonic: a stored stat is only replaced by one with an equal or greater
/// index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStat {
    pub index: i64,
    pub hash: String,
    #[serde(default)]
    pub afp: AggregatedFinalizationProof,
}

impl VotingStat {
    /// The "nothing recorded yet" stat.
    pub fn template() -> Self {
        Self {
            index: -1,
            hash: ZERO_HASH.to_string(),
            afp: AggregatedFinalizationProof::default(),
        }
    }

    /// True when no block of the creator has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.index < 0
    }

    /// Greater index, or the same index with a different hash.
    pub fn is_fresher_than(&self, other: &VotingStat) -> bool {
        self.index > other.index
            || (self.index == other.index && !self.hash.eq_ignore_ascii_case(&other.hash))
    }

    /// Same or greater index with the same hash.
    pub fn covers(&self, other: &VotingStat) -> bool {
        self.index >= other.index && self.hash.eq_ignore_ascii_case(&other.hash)
    }
}

impl Default for VotingStat {
    fn default() -> Self {
        Self::template()
    }
}

// =============================================================================
// PROOF BUNDLES
// =============================================================================

/// Quorum attestation justifying the hand-off of a stalled anchor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRotationProof {
    pub epoch_index: u64,
    pub creator: ValidatorId,
    pub voting_stat: VotingStat,
    #[serde(default)]
    pub signatures: SignatureMap,
}

/// Attestation for the leader role's last finalized block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderFinalizationProof {
    pub epoch_index: u64,
    pub leader: ValidatorId,
    pub voting_stat: VotingStat,
    #[serde(default)]
    pub signatures: SignatureMap,
}

// =============================================================================
// GOVERNANCE
// =============================================================================

/// Governance constants, fixed at genesis and carried forward each epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParameters {
    pub quorum_size: usize,
    /// Epoch length in milliseconds.
    pub epoch_duration: u64,
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self {
            quorum_size: 21,
            epoch_duration: 60 * 60 * 1000,
        }
    }
}

/// Snapshot of one epoch's governance facts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochDataHandler {
    pub id: u64,
    pub hash: String,
    pub validators_registry: Vec<ValidatorId>,
    pub quorum: Vec<ValidatorId>,
    pub leaders_sequence: Vec<ValidatorId>,
    pub current_leader_index: usize,
    /// Epoch start in milliseconds.
    pub start_timestamp: u64,
}

impl EpochDataHandler {
    /// `hash#id`, the epoch reference embedded in blocks and signatures.
    pub fn full_id(&self) -> String {
        format!("{}#{}", self.hash, self.id)
    }

    /// The epoch window has not elapsed yet.
    pub fn is_fresh(&self, params: &NetworkParameters, now_ms: u64) -> bool {
        self.start_timestamp.saturating_add(params.epoch_duration) > now_ms
    }

    pub fn current_leader(&self) -> Option<&ValidatorId> {
        self.leaders_sequence.get(self.current_leader_index)
    }

    pub fn leader_position(&self, validator: &ValidatorId) -> Option<usize> {
        self.leaders_sequence.iter().position(|v| v == validator)
    }

    pub fn in_registry(&self, validator: &ValidatorId) -> bool {
        self.validators_registry.contains(validator)
    }

    pub fn in_quorum(&self, validator: &ValidatorId) -> bool {
        self.quorum.contains(validator)
    }
}

/// Root consensus state persisted under `AT`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovementThreadMetadataHandler {
    pub core_major_version: i32,
    pub network_parameters: NetworkParameters,
    pub epoch: EpochDataHandler,
}

/// Precomputed governance facts of the next epoch (`EPOCH_DATA:<id>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextEpochDataHandler {
    pub next_epoch_hash: String,
    pub next_epoch_validators_registry: Vec<ValidatorId>,
    pub next_epoch_quorum: Vec<ValidatorId>,
    pub next_epoch_leaders_sequence: Vec<ValidatorId>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Per-validator record kept in the approvement-thread namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorStorage {
    pub pubkey: ValidatorId,
    /// Base URL of the validator's transport endpoint.
    #[serde(default)]
    pub url: String,
}

/// A quorum member with the URL used to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumMember {
    pub pubkey: ValidatorId,
    pub url: String,
}

// =============================================================================
// EPOCH BOOKKEEPING
// =============================================================================

/// Identity of the epoch's first block as implied by the AFP of the second
/// block. Recorded once per epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstBlockAssumption {
    pub index_of_first_block_creator: usize,
    pub afp_for_second_block: AggregatedFinalizationProof,
}

/// One opaque delayed operation (`type` tag plus free-form fields).
pub type DelayedTransaction = BTreeMap<String, String>;

/// Batch of delayed operations carried by an epoch's first block, together
/// with the quorum signatures agreeing on it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedTransactionsBatch {
    pub epoch_index: u64,
    #[serde(default)]
    pub delayed_transactions: Vec<DelayedTransaction>,
    #[serde(default)]
    pub proofs: SignatureMap,
}

impl DelayedTransactionsBatch {
    /// Message every quorum member signs to agree on the batch.
    pub fn signing_message(&self) -> String {
        let encoded =
            serde_json::to_string(&self.delayed_transactions).unwrap_or_else(|_| "[]".to_string());
        format!("SIG_DELAYED_OPERATIONS:{}:{}", self.epoch_index, encoded)
    }
}

/// Why finalization proofs stopped being produced for a creator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCreatorHealthStatus {
    pub epoch: u64,
    pub creator: ValidatorId,
}
