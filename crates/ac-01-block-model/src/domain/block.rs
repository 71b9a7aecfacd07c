//! # Block
//!
//! One unit of an anchor's append-only chain.

use super::extra_data::ExtraData;
use super::metadata::GenerationMetadata;
use crate::error::{BlockError, BlockResult};
use serde::{Deserialize, Serialize};
use shared_crypto::{blake3_hex, verify_hex, NodeIdentity};
use shared_types::{BlockId, ValidatorId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub creator: ValidatorId,
    /// Creation time in milliseconds.
    pub time: u64,
    /// Epoch full id (`hash#id`).
    pub epoch: String,
    #[serde(default)]
    pub extra_data: ExtraData,
    pub index: u64,
    pub prev_hash: String,
    #[serde(default)]
    pub sig: String,
}

/// Parse the numeric epoch id out of `hash#id`.
pub fn epoch_index_from_full_id(epoch_full_id: &str) -> BlockResult<u64> {
    epoch_full_id
        .rsplit_once('#')
        .and_then(|(_, id)| id.parse().ok())
        .ok_or_else(|| BlockError::MalformedEpochFullId(epoch_full_id.to_string()))
}

impl Block {
    /// Unsigned block at the proposer's current chain position.
    pub fn new(
        creator: ValidatorId,
        time: u64,
        extra_data: ExtraData,
        metadata: &GenerationMetadata,
    ) -> Self {
        Self {
            creator,
            time,
            epoch: metadata.epoch_full_id.clone(),
            extra_data,
            index: metadata.next_index,
            prev_hash: metadata.prev_hash.clone(),
            sig: String::new(),
        }
    }

    /// Canonical hash as lowercase hex.
    pub fn hash(&self, network_id: &str) -> String {
        let data = [
            self.creator.to_string(),
            self.time.to_string(),
            network_id.to_string(),
            self.epoch.clone(),
            self.extra_data.canonical_string(),
            self.index.to_string(),
            self.prev_hash.clone(),
        ]
        .join(":");
        blake3_hex(&data)
    }

    /// Sign the canonical hash with the local identity.
    pub fn sign(&mut self, identity: &NodeIdentity, network_id: &str) {
        self.sig = identity.sign(&self.hash(network_id));
    }

    /// Recompute the hash and check the signature against `creator`.
    pub fn verify_signature(&self, network_id: &str) -> bool {
        verify_hex(&self.hash(network_id), self.creator.as_str(), &self.sig)
    }

    pub fn epoch_index(&self) -> BlockResult<u64> {
        epoch_index_from_full_id(&self.epoch)
    }

    /// Composite id `epoch:creator:index`.
    pub fn id(&self) -> BlockResult<BlockId> {
        Ok(BlockId::new(self.epoch_index()?, self.creator.clone(), self.index))
    }
}
