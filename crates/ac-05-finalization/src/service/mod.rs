//! # Finalization Service
//!
//! Acceptor side of the finalization protocol plus the block/AFP lookups
//! backing the inbound surface.
//!
//! ```text
//! routes open ──→ leader? ──→ epoch match ──→ creator enabled ──→ signature
//!             ──→ epoch not finished ──→ stat lock (epoch, creator)
//!             ──→ voting stat continuity ──→ previous AFP linkage
//!             ──→ atomic batch [block, AFP:<prev>, stat, assumption?]
//!             ──→ sign prevHash:blockId:blockHash:epochFullId
//! ```
//!
//! A vote is only produced after the batch committed.

mod proposer;

pub use proposer::{BlockProposer, ProposerConfig};

use crate::domain::messages::{BlockWithAfp, FinalizationRequest, FinalizationVote};
use crate::error::{FinalizationError, FinalizationResult};
use ac_01_block_model::Block;
use ac_02_quorum_selection::{finalization_message, verify_afp_linkage};
use ac_03_epoch_state::EpochState;
use parking_lot::Mutex;
use shared_crypto::NodeIdentity;
use shared_types::{
    keys, AggregatedFinalizationProof, BatchOperation, BlockId, FirstBlockAssumption,
    JsonStoreExt, Namespace, ValidatorId, VotingStat, ZERO_HASH,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct FinalizationService {
    state: Arc<EpochState>,
    identity: Arc<NodeIdentity>,
    assumption_lock: Mutex<()>,
}

impl FinalizationService {
    pub fn new(state: Arc<EpochState>, identity: Arc<NodeIdentity>) -> Self {
        Self {
            state,
            identity,
            assumption_lock: Mutex::new(()),
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Verify `request`, persist its block, and vote for it.
    pub fn handle_request(
        &self,
        request: &FinalizationRequest,
    ) -> FinalizationResult<FinalizationVote> {
        let result = self.try_vote(request);
        if let Err(e) = &result {
            debug!(
                creator = %request.block.creator,
                index = request.block.index,
                error = %e,
                "[ac-05] Finalization request rejected"
            );
        }
        result
    }

    fn try_vote(&self, request: &FinalizationRequest) -> FinalizationResult<FinalizationVote> {
        let block = &request.block;
        let network_id = self.state.network_id();

        let root = self.state.read_for_route()?;
        let epoch = &root.epoch;
        let epoch_full_id = epoch.full_id();

        if epoch.current_leader() != Some(&block.creator) {
            return Err(FinalizationError::NotLeader {
                creator: block.creator.clone(),
            });
        }
        if block.epoch != epoch_full_id {
            return Err(FinalizationError::WrongEpoch {
                expected: epoch_full_id,
                actual: block.epoch.clone(),
            });
        }
        if self.state.is_finalization_disabled(epoch.id, &block.creator)? {
            return Err(FinalizationError::CreatorDisabled {
                creator: block.creator.clone(),
            });
        }
        if !block.verify_signature(network_id) {
            return Err(FinalizationError::InvalidBlockSignature);
        }
        if self.state.is_epoch_finished(epoch.id)? {
            return Err(FinalizationError::EpochFinished(epoch.id));
        }

        // Held through the commit: the rotation responder and proof
        // acceptance write this creator's stat under the same mutex.
        let shard = self.state.stat_lock(epoch.id, &block.creator);
        let _guard = shard.lock();

        let block_hash = block.hash(network_id);
        let local = self.state.voting_stat(epoch.id, &block.creator)?;
        let offered = block.index as i64;
        let continues = local.index < offered
            || (local.index == offered && local.hash.eq_ignore_ascii_case(&block_hash));
        if !continues {
            return Err(FinalizationError::StaleIndex {
                local: local.index,
                offered: block.index,
            });
        }

        let block_id = BlockId::new(epoch.id, block.creator.clone(), block.index);
        let block_key = block_id.to_string();
        let stored: Option<Block> = self.state.store().get_json(Namespace::Blocks, &block_key)?;
        if let Some(stored) = stored {
            if stored.hash(network_id) != block_hash {
                return Err(FinalizationError::Equivocation {
                    block_id: block_key,
                });
            }
        }

        let mut ops = vec![BatchOperation::put_json(Namespace::Blocks, &block_key, block)?];

        let prev_block_hash = match block_id.previous() {
            None => {
                if block.prev_hash != ZERO_HASH {
                    return Err(FinalizationError::FirstBlockPrevHash {
                        prev_hash: block.prev_hash.clone(),
                    });
                }
                ZERO_HASH.to_string()
            }
            Some(prev_id) => {
                let afp = request
                    .previous_block_afp
                    .as_ref()
                    .ok_or(FinalizationError::MissingPreviousAfp)?;
                verify_afp_linkage(
                    afp,
                    &prev_id.to_string(),
                    Some(&block.prev_hash),
                    &epoch_full_id,
                    &epoch.quorum,
                )?;
                ops.push(BatchOperation::put_json(
                    Namespace::EpochData,
                    keys::afp(&prev_id.to_string()),
                    afp,
                )?);
                if local.index != offered {
                    let next = VotingStat {
                        index: offered - 1,
                        hash: afp.block_hash.clone(),
                        afp: afp.clone(),
                    };
                    ops.push(EpochState::voting_stat_op(epoch.id, &block.creator, &next)?);
                }
                afp.block_hash.clone()
            }
        };

        {
            let _assumption = self.assumption_lock.lock();
            if block.index == 2 {
                let position = epoch.leader_position(&block.creator);
                if let Some(op) =
                    self.first_block_assumption_op(request, epoch.id, &block.creator, position)?
                {
                    ops.push(op);
                }
            }
            self.state.store().atomic_batch_write(ops)?;
        }

        let message = finalization_message(&prev_block_hash, &block_key, &block_hash, &epoch_full_id);
        let vote = FinalizationVote {
            voter: ValidatorId::from(self.identity.public_key()),
            finalization_proof: self.identity.sign(&message),
            voted_for_hash: block_hash,
        };
        debug!(
            epoch = epoch.id,
            creator = %block.creator,
            index = block.index,
            "[ac-05] Finalization vote issued"
        );
        Ok(vote)
    }

    /// Assumption derived from the AFP of block 1, recorded once per epoch.
    fn first_block_assumption_op(
        &self,
        request: &FinalizationRequest,
        epoch: u64,
        creator: &ValidatorId,
        position: Option<usize>,
    ) -> FinalizationResult<Option<BatchOperation>> {
        let (Some(position), Some(afp)) = (position, request.previous_block_afp.as_ref()) else {
            return Ok(None);
        };
        let key = keys::first_block_assumption(epoch);
        if self.state.store().exists(Namespace::EpochData, &key)? {
            return Ok(None);
        }
        info!(
            epoch,
            creator = %creator,
            position,
            first_block_hash = %afp.prev_block_hash,
            "[ac-05] First block assumption recorded"
        );
        let assumption = FirstBlockAssumption {
            index_of_first_block_creator: position,
            afp_for_second_block: afp.clone(),
        };
        Ok(Some(BatchOperation::put_json(
            Namespace::EpochData,
            key,
            &assumption,
        )?))
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// `AFP:<blockId>`.
    pub fn get_afp(&self, block_id: &str) -> FinalizationResult<Option<AggregatedFinalizationProof>> {
        Ok(self
            .state
            .store()
            .get_json(Namespace::EpochData, &keys::afp(block_id))?)
    }

    /// Stored block plus the AFP of the next block in its segment.
    pub fn block_with_afp(&self, block_id: &str) -> FinalizationResult<Option<BlockWithAfp>> {
        let id: BlockId = block_id.parse()?;
        let block: Option<Block> = self
            .state
            .store()
            .get_json(Namespace::Blocks, &id.to_string())?;
        let Some(block) = block else {
            return Ok(None);
        };
        let afp = self.get_afp(&id.next().to_string())?;
        Ok(Some(BlockWithAfp { block, afp }))
    }
}
