//! # Extra Data
//!
//! Tagged union carried by every block. The JSON encoding is adjacently
//! tagged (`{"type": ..., "payload": ...}`), so decoding never has to guess
//! the shape.
//!
//! Maps are `BTreeMap`s, which makes `serde_json` output key-sorted and the
//! canonical encoding used by the block hash reproducible on every node.

use serde::{Deserialize, Serialize};
use shared_types::{AnchorRotationProof, DelayedTransactionsBatch, LeaderFinalizationProof};
use std::collections::BTreeMap;

/// Proofs and operations drained into a block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPayload {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub rotation_proofs: Vec<AnchorRotationProof>,
    #[serde(default)]
    pub leader_finalization_proofs: Vec<LeaderFinalizationProof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed_transactions_batch: Option<DelayedTransactionsBatch>,
}

impl BlockPayload {
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.rotation_proofs.is_empty()
            && self.leader_finalization_proofs.is_empty()
            && self.delayed_transactions_batch.is_none()
    }

    fn has_proofs(&self) -> bool {
        !self.rotation_proofs.is_empty()
            || !self.leader_finalization_proofs.is_empty()
            || self.delayed_transactions_batch.is_some()
    }
}

/// Extra data of a block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ExtraData {
    /// Nothing attached.
    #[default]
    Empty,
    /// Free-form string fields only.
    Fields(BTreeMap<String, String>),
    /// Proof bundles and/or a delayed-transactions batch, with optional fields.
    Payload(BlockPayload),
}

impl ExtraData {
    /// Build the smallest variant that represents `payload`.
    pub fn from_payload(payload: BlockPayload) -> Self {
        if payload.is_empty() {
            ExtraData::Empty
        } else if !payload.has_proofs() {
            ExtraData::Fields(payload.fields)
        } else {
            ExtraData::Payload(payload)
        }
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ExtraData::Fields(fields) => Some(fields),
            ExtraData::Payload(p) => Some(&p.fields),
            ExtraData::Empty => None,
        }
    }

    pub fn rotation_proofs(&self) -> &[AnchorRotationProof] {
        match self {
            ExtraData::Payload(p) => &p.rotation_proofs,
            _ => &[],
        }
    }

    pub fn leader_finalization_proofs(&self) -> &[LeaderFinalizationProof] {
        match self {
            ExtraData::Payload(p) => &p.leader_finalization_proofs,
            _ => &[],
        }
    }

    pub fn delayed_transactions_batch(&self) -> Option<&DelayedTransactionsBatch> {
        match self {
            ExtraData::Payload(p) => p.delayed_transactions_batch.as_ref(),
            _ => None,
        }
    }

    /// Encoding hashed into the block: empty string for `Empty`, canonical
    /// JSON otherwise.
    pub fn canonical_string(&self) -> String {
        match self {
            ExtraData::Empty => String::new(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}
