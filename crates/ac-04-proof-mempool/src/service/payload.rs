//! Block payload assembly from the two mempools.

use crate::domain::mempool::ProofMempool;
use crate::domain::proof::AggregatedProof;
use ac_01_block_model::{BlockPayload, ExtraData};
use shared_types::{AnchorRotationProof, DelayedTransactionsBatch, LeaderFinalizationProof};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Both mempools of a node.
#[derive(Default, Clone)]
pub struct ProofPools {
    pub rotation: Arc<ProofMempool<AnchorRotationProof>>,
    pub leader_finalization: Arc<ProofMempool<LeaderFinalizationProof>>,
}

impl ProofPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain both mempools into the extra data of the next block. Proofs are
    /// ordered by mempool key so the payload does not depend on map order.
    pub fn drain_into_extra_data(
        &self,
        fields: BTreeMap<String, String>,
        delayed_transactions_batch: Option<DelayedTransactionsBatch>,
    ) -> ExtraData {
        let mut rotation_proofs = self.rotation.drain();
        rotation_proofs.sort_by_key(|p| p.mempool_key());
        let mut leader_finalization_proofs = self.leader_finalization.drain();
        leader_finalization_proofs.sort_by_key(|p| p.mempool_key());

        ExtraData::from_payload(BlockPayload {
            fields,
            rotation_proofs,
            leader_finalization_proofs,
            delayed_transactions_batch,
        })
    }
}
