//! # Rotation Service
//!
//! Inbound side of anchor rotation: the rotation-signature responder and
//! acceptance of collected proofs broadcast by peers.
//!
//! Responder decision table, under the `(epoch, creator)` lock:
//!
//! | Local stat | Proposal | Answer |
//! |---|---|---|
//! | none | any | `UPGRADE` |
//! | fresher | any | `OK` + local stat, no signature |
//! | equal | equal | disable finalization, `OK` + signature |
//! | older | AFP verifies | adopt proposal, disable finalization, `OK` + signature |

mod collector;
mod liveness;

pub use collector::{CollectorConfig, RotationCollector};
pub use liveness::LivenessMonitor;

use crate::domain::messages::{
    rotation_message, AcceptRotationProofsRequest, AnchorRotationProofRequest,
    AnchorRotationProofResponse,
};
use crate::domain::policy::StrictQuorumPolicy;
use crate::error::{RotationError, RotationResult};
use ac_02_quorum_selection::verify_afp_linkage;
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::{ProofAcceptor, ProofMempool, ProofResult};
use shared_crypto::NodeIdentity;
use shared_types::{AnchorRotationProof, BlockId};
use std::sync::Arc;
use tracing::{debug, info};

pub struct RotationService {
    state: Arc<EpochState>,
    identity: Arc<NodeIdentity>,
    acceptor: ProofAcceptor<AnchorRotationProof, StrictQuorumPolicy>,
}

impl RotationService {
    pub fn new(
        state: Arc<EpochState>,
        identity: Arc<NodeIdentity>,
        mempool: Arc<ProofMempool<AnchorRotationProof>>,
    ) -> Self {
        let policy = StrictQuorumPolicy::new(state.clone());
        Self {
            acceptor: ProofAcceptor::new(state.clone(), mempool, policy),
            state,
            identity,
        }
    }

    pub fn mempool(&self) -> &Arc<ProofMempool<AnchorRotationProof>> {
        self.acceptor.mempool()
    }

    /// Answer a rotation-signature request.
    pub async fn respond(
        &self,
        request: &AnchorRotationProofRequest,
    ) -> RotationResult<AnchorRotationProofResponse> {
        self.state.ensure_routes_open()?;
        let epoch = self
            .state
            .tracked_epoch(request.epoch_index)
            .ok_or(RotationError::UntrackedEpoch(request.epoch_index))?;
        let creator = &request.creator;
        if !epoch.in_registry(creator) {
            return Err(RotationError::UnknownCreator {
                epoch: epoch.id,
                creator: creator.clone(),
            });
        }
        if self.state.is_epoch_finished(epoch.id)? {
            return Err(RotationError::EpochFinished(epoch.id));
        }

        let lock = self.state.locks().get(epoch.id, creator);
        let _guard = lock.lock().await;

        let local = self.state.voting_stat(epoch.id, creator)?;
        if local.is_empty() {
            debug!(epoch = epoch.id, creator = %creator, "[ac-06] No local stat, asking for upgrade");
            return Ok(AnchorRotationProofResponse::upgrade());
        }
        let proposal = &request.proposal;
        if local.is_fresher_than(proposal) {
            debug!(
                epoch = epoch.id,
                creator = %creator,
                local = local.index,
                proposed = proposal.index,
                "[ac-06] Local stat is fresher"
            );
            return Ok(AnchorRotationProofResponse::fresher(local));
        }

        let epoch_full_id = epoch.full_id();
        if proposal.index > local.index {
            if proposal.hash.is_empty() {
                return Err(RotationError::InvalidProposal);
            }
            let block_id = BlockId::new(epoch.id, creator.clone(), proposal.index as u64);
            verify_afp_linkage(
                &proposal.afp,
                &block_id.to_string(),
                Some(&proposal.hash),
                &epoch_full_id,
                &epoch.quorum,
            )?;
            self.state.store_voting_stat(epoch.id, creator, proposal)?;
        }

        self.state.disable_finalization(epoch.id, creator)?;
        let signature = self
            .identity
            .sign(&rotation_message(epoch.id, creator, proposal, &epoch_full_id));
        info!(
            epoch = epoch.id,
            creator = %creator,
            index = proposal.index,
            "[ac-06] Rotation signature issued"
        );
        Ok(AnchorRotationProofResponse::signed(proposal.clone(), signature))
    }

    /// Accept proofs collected by a peer, in order, stopping at the first
    /// rejection.
    pub async fn accept_rotation_proofs(
        &self,
        request: AcceptRotationProofsRequest,
    ) -> ProofResult<usize> {
        self.acceptor.accept_batch(request.rotation_proofs).await
    }
}
