//! # Block Proposer
//!
//! Proposer side: build and persist the next own block, then collect a
//! majority of quorum votes into its AFP.
//!
//! A block whose AFP could not be collected is retried on the next call
//! before a new block is built, so the segment never runs ahead of its
//! proofs by more than one block.

use super::FinalizationService;
use crate::domain::messages::{FinalizationRequest, FinalizationVote};
use crate::error::{FinalizationError, FinalizationResult};
use crate::ports::outbound::FinalizationPeer;
use ac_01_block_model::{Block, GenerationMetadata};
use ac_02_quorum_selection::{finalization_message, majority};
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::ProofPools;
use futures::stream::{FuturesUnordered, StreamExt};
use shared_crypto::{verify_hex, NodeIdentity};
use shared_types::{
    keys, AggregatedFinalizationProof, BatchOperation, BlockId, DelayedTransactionsBatch,
    JsonStoreExt, Namespace, PeerError, SignatureMap, ValidatorId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct ProposerConfig {
    /// URL of this node; never called.
    pub my_url: String,
    /// Per-peer request timeout.
    pub request_timeout: Duration,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            my_url: String::new(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

pub struct BlockProposer {
    state: Arc<EpochState>,
    local: Arc<FinalizationService>,
    pools: ProofPools,
    peer: Arc<dyn FinalizationPeer>,
    config: ProposerConfig,
}

impl BlockProposer {
    pub fn new(
        state: Arc<EpochState>,
        local: Arc<FinalizationService>,
        pools: ProofPools,
        peer: Arc<dyn FinalizationPeer>,
        config: ProposerConfig,
    ) -> Self {
        Self {
            state,
            local,
            pools,
            peer,
            config,
        }
    }

    fn identity(&self) -> &NodeIdentity {
        self.local.identity()
    }

    fn me(&self) -> ValidatorId {
        ValidatorId::from(self.identity().public_key())
    }

    /// Stored `GT`, or the genesis value on first start.
    pub fn generation_metadata(&self) -> FinalizationResult<GenerationMetadata> {
        let stored: Option<GenerationMetadata> = self
            .state
            .store()
            .get_json(Namespace::Blocks, keys::GENERATION_METADATA)?;
        Ok(stored.unwrap_or_else(|| GenerationMetadata::genesis(self.state.network_id())))
    }

    /// Build, sign and persist the next own block together with the
    /// advanced generation metadata. Drained proofs go back to the mempools
    /// when the commit fails.
    pub fn propose(
        &self,
        fields: BTreeMap<String, String>,
        delayed_transactions_batch: Option<DelayedTransactionsBatch>,
        now_ms: u64,
    ) -> FinalizationResult<Block> {
        let epoch_full_id = self.state.current_epoch().full_id();
        let metadata = self.generation_metadata()?.for_epoch(&epoch_full_id);
        let network_id = self.state.network_id();

        let extra_data = self
            .pools
            .drain_into_extra_data(fields, delayed_transactions_batch);
        let mut block = Block::new(self.me(), now_ms, extra_data, &metadata);
        block.sign(self.identity(), network_id);
        let hash = block.hash(network_id);

        let ops = vec![
            BatchOperation::put_json(Namespace::Blocks, block.id()?.to_string(), &block)?,
            BatchOperation::put_json(
                Namespace::Blocks,
                keys::GENERATION_METADATA,
                &metadata.advance(&hash),
            )?,
        ];
        if let Err(e) = self.state.store().atomic_batch_write(ops) {
            for proof in block.extra_data.rotation_proofs() {
                self.pools.rotation.add(proof.clone());
            }
            for proof in block.extra_data.leader_finalization_proofs() {
                self.pools.leader_finalization.add(proof.clone());
            }
            return Err(e.into());
        }

        info!(
            epoch = %block.epoch,
            index = block.index,
            rotation_proofs = block.extra_data.rotation_proofs().len(),
            "[ac-05] Block proposed"
        );
        Ok(block)
    }

    /// Ask the quorum to vote for `block` and persist the AFP once a
    /// majority of valid votes arrived. `None` when the majority was not
    /// reached.
    pub async fn collect_afp(
        &self,
        block: &Block,
        previous_block_afp: Option<AggregatedFinalizationProof>,
    ) -> FinalizationResult<Option<AggregatedFinalizationProof>> {
        let epoch = self.state.current_epoch();
        let epoch_full_id = epoch.full_id();
        if block.epoch != epoch_full_id {
            return Err(FinalizationError::WrongEpoch {
                expected: epoch_full_id,
                actual: block.epoch.clone(),
            });
        }

        let block_id = block.id()?.to_string();
        let block_hash = block.hash(self.state.network_id());
        let prev_block_hash = block.prev_hash.clone();
        let message = finalization_message(&prev_block_hash, &block_id, &block_hash, &epoch_full_id);
        let need = majority(epoch.quorum.len());
        let request = FinalizationRequest {
            block: block.clone(),
            previous_block_afp,
        };

        let accepts = |vote: &FinalizationVote| {
            epoch.in_quorum(&vote.voter)
                && vote.voted_for_hash.eq_ignore_ascii_case(&block_hash)
                && verify_hex(&message, vote.voter.as_str(), &vote.finalization_proof)
        };

        let mut proofs = SignatureMap::new();
        let me = self.me();
        if epoch.in_quorum(&me) {
            match self.local.handle_request(&request) {
                Ok(vote) if accepts(&vote) => {
                    proofs.insert(vote.voter, vote.finalization_proof);
                }
                Ok(_) => {}
                Err(e) => warn!(block_id = %block_id, error = %e, "[ac-05] Local vote refused"),
            }
        }

        let members: Vec<_> = self
            .state
            .quorum_members(&epoch)
            .into_iter()
            .filter(|m| m.pubkey != me && m.url != self.config.my_url)
            .collect();
        let mut requests: FuturesUnordered<_> = members
            .iter()
            .map(|m| self.request_vote(&m.url, &request))
            .collect();

        while proofs.len() < need {
            let Some(result) = requests.next().await else {
                break;
            };
            match result {
                Ok(Some(vote)) if accepts(&vote) => {
                    proofs.insert(vote.voter, vote.finalization_proof);
                }
                Ok(Some(vote)) => {
                    debug!(block_id = %block_id, voter = %vote.voter, "[ac-05] Invalid vote ignored")
                }
                Ok(None) => {}
                Err(e) => debug!(block_id = %block_id, error = %e, "[ac-05] Peer abstained"),
            }
        }

        if proofs.len() < need {
            debug!(
                block_id = %block_id,
                signatures = proofs.len(),
                need,
                "[ac-05] Majority not reached"
            );
            return Ok(None);
        }

        let afp = AggregatedFinalizationProof {
            prev_block_hash,
            block_id: block_id.clone(),
            block_hash,
            proofs,
        };
        self.state
            .store()
            .put_json(Namespace::EpochData, &keys::afp(&block_id), &afp)?;
        info!(
            block_id = %block_id,
            signatures = afp.proofs.len(),
            "[ac-05] AFP collected"
        );
        Ok(Some(afp))
    }

    async fn request_vote(
        &self,
        url: &str,
        request: &FinalizationRequest,
    ) -> Result<Option<FinalizationVote>, PeerError> {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.peer.request_finalization(url, request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PeerError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// One generation step while this node is the current leader: finish
    /// the AFP of the last own block if it is missing, otherwise propose and
    /// certify a new block.
    pub async fn produce(
        &self,
        fields: BTreeMap<String, String>,
        delayed_transactions_batch: Option<DelayedTransactionsBatch>,
        now_ms: u64,
    ) -> FinalizationResult<Option<AggregatedFinalizationProof>> {
        let epoch = self.state.current_epoch();
        let me = self.me();
        if epoch.current_leader() != Some(&me) {
            return Ok(None);
        }

        let metadata = self.generation_metadata()?.for_epoch(&epoch.full_id());
        if let Some(last_index) = metadata.next_index.checked_sub(1) {
            let last_id = BlockId::new(epoch.id, me.clone(), last_index);
            if self.local.get_afp(&last_id.to_string())?.is_none() {
                let last: Option<Block> = self
                    .state
                    .store()
                    .get_json(Namespace::Blocks, &last_id.to_string())?;
                if let Some(last) = last {
                    debug!(block_id = %last_id, "[ac-05] Retrying AFP collection");
                    let previous = self.previous_afp(&last_id)?;
                    return self.collect_afp(&last, previous).await;
                }
            }
        }

        let block = self.propose(fields, delayed_transactions_batch, now_ms)?;
        let previous = self.previous_afp(&block.id()?)?;
        self.collect_afp(&block, previous).await
    }

    fn previous_afp(&self, id: &BlockId) -> FinalizationResult<Option<AggregatedFinalizationProof>> {
        match id.previous() {
            Some(prev) => self.local.get_afp(&prev.to_string()),
            None => Ok(None),
        }
    }

    /// Generation loop. Errors are logged and retried on the next tick.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self
                .produce(BTreeMap::new(), None, shared_types::time::now_ms())
                .await
            {
                warn!(error = %e, "[ac-05] Block generation step failed");
            }
        }
    }
}
