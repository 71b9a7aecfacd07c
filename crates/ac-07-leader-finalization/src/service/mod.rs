//! Inbound acceptance of leader-finalization proofs.


use crate::domain::messages::AcceptLeaderFinalizationRequest;
use crate::domain::policy::PresenceOnlyPolicy;
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::{ProofAcceptor, ProofMempool, ProofResult, ValidationPolicy};
use shared_types::LeaderFinalizationProof;
use std::sync::Arc;
use tracing::debug;

pub struct LeaderFinalizationService<V = PresenceOnlyPolicy> {
    acceptor: ProofAcceptor<LeaderFinalizationProof, V>,
}

impl LeaderFinalizationService<PresenceOnlyPolicy> {
    pub fn new(state: Arc<EpochState>, mempool: Arc<ProofMempool<LeaderFinalizationProof>>) -> Self {
        Self::with_policy(state, mempool, PresenceOnlyPolicy)
    }
}

impl<V> LeaderFinalizationService<V>
where
    V: ValidationPolicy<LeaderFinalizationProof>,
{
    pub fn with_policy(
        state: Arc<EpochState>,
        mempool: Arc<ProofMempool<LeaderFinalizationProof>>,
        policy: V,
    ) -> Self {
        Self {
            acceptor: ProofAcceptor::new(state, mempool, policy),
        }
    }

    pub fn mempool(&self) -> &Arc<ProofMempool<LeaderFinalizationProof>> {
        self.acceptor.mempool()
    }

    /// Accept a batch in order, stopping at the first rejection.
    pub async fn accept_leader_finalizations(
        &self,
        request: AcceptLeaderFinalizationRequest,
    ) -> ProofResult<usize> {
        let offered = request.leader_finalizations.len();
        let accepted = self
            .acceptor
            .accept_batch(request.leader_finalizations)
            .await;
        if let Err(e) = &accepted {
            debug!(offered, error = %e, "[ac-07] Leader finalization batch rejected");
        }
        accepted
    }
}
