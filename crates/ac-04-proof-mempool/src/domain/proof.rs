//! # Aggregated Proofs
//!
//! Common view over the two proof families carried in blocks.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    keys, AnchorRotationProof, LeaderFinalizationProof, SignatureMap, ValidatorId, VotingStat,
};

pub trait AggregatedProof: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Short name used in logs.
    const KIND: &'static str;

    fn epoch_index(&self) -> u64;

    /// Validator the proof is about (creator or leader).
    fn subject(&self) -> &ValidatorId;

    fn voting_stat(&self) -> &VotingStat;

    fn signatures(&self) -> &SignatureMap;

    /// Key in the finalization-voting-stats namespace.
    fn storage_key(&self) -> String;

    /// Dedup key `epoch:subject:votingIndex`.
    fn mempool_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.epoch_index(),
            self.subject(),
            self.voting_stat().index
        )
    }
}

impl AggregatedProof for AnchorRotationProof {
    const KIND: &'static str = "anchor-rotation";

    fn epoch_index(&self) -> u64 {
        self.epoch_index
    }

    fn subject(&self) -> &ValidatorId {
        &self.creator
    }

    fn voting_stat(&self) -> &VotingStat {
        &self.voting_stat
    }

    fn signatures(&self) -> &SignatureMap {
        &self.signatures
    }

    fn storage_key(&self) -> String {
        keys::anchor_rotation_proof(self.epoch_index, &self.creator)
    }
}

impl AggregatedProof for LeaderFinalizationProof {
    const KIND: &'static str = "leader-finalization";

    fn epoch_index(&self) -> u64 {
        self.epoch_index
    }

    fn subject(&self) -> &ValidatorId {
        &self.leader
    }

    fn voting_stat(&self) -> &VotingStat {
        &self.voting_stat
    }

    fn signatures(&self) -> &SignatureMap {
        &self.signatures
    }

    fn storage_key(&self) -> String {
        keys::leader_finalization_proof(self.epoch_index, &self.leader)
    }
}
