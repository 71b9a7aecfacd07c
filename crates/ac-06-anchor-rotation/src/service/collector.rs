//! # Rotation Collector
//!
//! Periodic task. For every tracked epoch and every registry member whose
//! finalization is disabled and who has no rotation proof yet, ask the
//! quorum to sign the member's last voting stat. At majority the proof is
//! persisted, pooled and broadcast.

use crate::domain::messages::{
    rotation_message, AcceptRotationProofsRequest, AnchorRotationProofRequest,
    AnchorRotationProofResponse, RotationStatus,
};
use crate::error::RotationResult;
use crate::ports::outbound::RotationPeer;
use ac_02_quorum_selection::{majority, verify_afp_linkage};
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::ProofMempool;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use shared_crypto::verify_hex;
use shared_types::{
    keys, AnchorRotationProof, BlockId, EpochDataHandler, JsonStoreExt, Namespace,
    PeerError, QuorumMember, SignatureMap, ValidatorId, VotingStat,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// URL of this node; never called.
    pub my_url: String,
    /// Per-peer request timeout.
    pub request_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            my_url: String::new(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of one signature round.
enum Round {
    Collected(SignatureMap),
    /// A peer knows a fresher stat, or none at all.
    Abandoned,
    Short(usize),
}

pub struct RotationCollector {
    state: Arc<EpochState>,
    me: ValidatorId,
    mempool: Arc<ProofMempool<AnchorRotationProof>>,
    peer: Arc<dyn RotationPeer>,
    config: CollectorConfig,
}

impl RotationCollector {
    pub fn new(
        state: Arc<EpochState>,
        me: ValidatorId,
        mempool: Arc<ProofMempool<AnchorRotationProof>>,
        peer: Arc<dyn RotationPeer>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            state,
            me,
            mempool,
            peer,
            config,
        }
    }

    /// One pass over every tracked epoch. Returns the proofs collected.
    pub async fn collect_once(&self) -> Vec<AnchorRotationProof> {
        let mut collected = Vec::new();
        for epoch in self.state.tracked_epochs() {
            for creator in &epoch.validators_registry {
                match self.collect_for(&epoch, creator).await {
                    Ok(Some(proof)) => collected.push(proof),
                    Ok(None) => {}
                    Err(e) => warn!(
                        epoch = epoch.id,
                        creator = %creator,
                        error = %e,
                        "[ac-06] Rotation round failed"
                    ),
                }
            }
        }
        collected
    }

    fn needs_proof(&self, epoch: u64, creator: &ValidatorId) -> RotationResult<bool> {
        if !self.state.is_finalization_disabled(epoch, creator)?
            || self.state.is_epoch_finished(epoch)?
        {
            return Ok(false);
        }
        let key = keys::anchor_rotation_proof(epoch, creator);
        Ok(!self
            .state
            .store()
            .exists(Namespace::FinalizationVotingStats, &key)?)
    }

    /// Run a signature round for `creator` if it needs a rotation proof.
    pub async fn collect_for(
        &self,
        epoch: &EpochDataHandler,
        creator: &ValidatorId,
    ) -> RotationResult<Option<AnchorRotationProof>> {
        if !self.needs_proof(epoch.id, creator)? {
            return Ok(None);
        }
        let lock = self.state.locks().get(epoch.id, creator);
        let _guard = lock.lock().await;
        if !self.needs_proof(epoch.id, creator)? {
            return Ok(None);
        }

        let stat = self.state.voting_stat(epoch.id, creator)?;
        if stat.is_empty() || stat.hash.is_empty() {
            return Ok(None);
        }

        let members: Vec<QuorumMember> = self
            .state
            .quorum_members(epoch)
            .into_iter()
            .filter(|m| m.pubkey != self.me && !m.url.is_empty() && m.url != self.config.my_url)
            .collect();

        let signatures = match self.gather(epoch, creator, &stat, &members).await? {
            Round::Collected(signatures) => signatures,
            Round::Abandoned => return Ok(None),
            Round::Short(have) => {
                debug!(
                    epoch = epoch.id,
                    creator = %creator,
                    signatures = have,
                    "[ac-06] Rotation majority not reached"
                );
                return Ok(None);
            }
        };

        let proof = AnchorRotationProof {
            epoch_index: epoch.id,
            creator: creator.clone(),
            voting_stat: stat,
            signatures,
        };
        self.state.store().put_json(
            Namespace::FinalizationVotingStats,
            &keys::anchor_rotation_proof(epoch.id, creator),
            &proof,
        )?;
        self.mempool.add(proof.clone());
        info!(
            epoch = epoch.id,
            creator = %creator,
            index = proof.voting_stat.index,
            signatures = proof.signatures.len(),
            "[ac-06] Rotation proof collected"
        );

        self.broadcast(&members, &proof).await;
        Ok(Some(proof))
    }

    async fn gather(
        &self,
        epoch: &EpochDataHandler,
        creator: &ValidatorId,
        stat: &VotingStat,
        members: &[QuorumMember],
    ) -> RotationResult<Round> {
        let need = majority(epoch.quorum.len());
        let epoch_full_id = epoch.full_id();
        let message = rotation_message(epoch.id, creator, stat, &epoch_full_id);
        let request = AnchorRotationProofRequest {
            epoch_index: epoch.id,
            creator: creator.clone(),
            proposal: stat.clone(),
        };

        let mut responses: FuturesUnordered<_> = members
            .iter()
            .map(|member| {
                let call = self.peer.request_rotation_signature(&member.url, &request);
                let bounded = self.bounded(&member.url, call);
                async move { (member, bounded.await) }
            })
            .collect();

        let mut signatures = SignatureMap::new();
        while signatures.len() < need {
            let Some((member, result)) = responses.next().await else {
                break;
            };
            let response: AnchorRotationProofResponse = match result {
                Ok(response) => response,
                Err(e) => {
                    debug!(peer = %member.url, error = %e, "[ac-06] Peer abstained");
                    continue;
                }
            };
            match (response.status, response.voting_stat) {
                (RotationStatus::Upgrade, offered) => {
                    if let Some(offered) = offered {
                        self.adopt(epoch, creator, &offered)?;
                    }
                    debug!(peer = %member.url, creator = %creator, "[ac-06] Peer asked for upgrade");
                    return Ok(Round::Abandoned);
                }
                (RotationStatus::Ok, None) => {}
                (RotationStatus::Ok, Some(offered)) if offered.is_fresher_than(stat) => {
                    self.adopt(epoch, creator, &offered)?;
                    return Ok(Round::Abandoned);
                }
                (RotationStatus::Ok, Some(_)) => {
                    let Some(signature) = response.signature else {
                        continue;
                    };
                    if verify_hex(&message, member.pubkey.as_str(), &signature) {
                        signatures.insert(member.pubkey.clone(), signature);
                    } else {
                        debug!(peer = %member.url, "[ac-06] Invalid rotation signature");
                    }
                }
            }
        }

        if signatures.len() >= need {
            Ok(Round::Collected(signatures))
        } else {
            Ok(Round::Short(signatures.len()))
        }
    }

    /// Store a stat offered by a peer once its AFP checks out.
    fn adopt(
        &self,
        epoch: &EpochDataHandler,
        creator: &ValidatorId,
        offered: &VotingStat,
    ) -> RotationResult<()> {
        if offered.is_empty() {
            return Ok(());
        }
        let block_id = BlockId::new(epoch.id, creator.clone(), offered.index as u64);
        if let Err(e) = verify_afp_linkage(
            &offered.afp,
            &block_id.to_string(),
            Some(&offered.hash),
            &epoch.full_id(),
            &epoch.quorum,
        ) {
            debug!(creator = %creator, error = %e, "[ac-06] Offered stat not adopted");
            return Ok(());
        }
        if self.state.store_voting_stat(epoch.id, creator, offered)? {
            info!(
                epoch = epoch.id,
                creator = %creator,
                index = offered.index,
                "[ac-06] Fresher voting stat adopted"
            );
        }
        Ok(())
    }

    async fn broadcast(&self, members: &[QuorumMember], proof: &AnchorRotationProof) {
        let request = AcceptRotationProofsRequest {
            rotation_proofs: vec![proof.clone()],
        };
        let calls = members.iter().map(|member| {
            let call = self.peer.broadcast_rotation_proofs(&member.url, &request);
            let bounded = self.bounded(&member.url, call);
            async move { (member, bounded.await) }
        });
        for (member, result) in join_all(calls).await {
            if let Err(e) = result {
                warn!(peer = %member.url, error = %e, "[ac-06] Rotation proof broadcast failed");
            }
        }
    }

    async fn bounded<T>(
        &self,
        url: &str,
        call: impl Future<Output = Result<T, PeerError>>,
    ) -> Result<T, PeerError> {
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PeerError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Collector loop.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.collect_once().await;
        }
    }
}
