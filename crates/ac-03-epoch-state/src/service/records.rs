//! Per-epoch records in the finalization-voting-stats namespace: finish
//! markers, block-creator health flags and voting stats.

use crate::error::EpochStateResult;
use super::EpochState;
use shared_types::{
    keys, BatchOperation, BlockCreatorHealthStatus, JsonStoreExt, KVResult, Namespace,
    ValidatorId, VotingStat,
};
use tracing::{debug, info};

impl EpochState {
    // =========================================================================
    // FINISH MARKERS
    // =========================================================================

    pub fn is_epoch_finished(&self, epoch: u64) -> EpochStateResult<bool> {
        Ok(self
            .store()
            .exists(Namespace::FinalizationVotingStats, &keys::epoch_finish(epoch))?)
    }

    /// Idempotent: once flagged, no new finalization or rotation proofs are
    /// produced for the epoch.
    pub fn mark_epoch_finished(&self, epoch: u64) -> EpochStateResult<()> {
        self.store().put(
            Namespace::FinalizationVotingStats,
            &keys::epoch_finish(epoch),
            keys::EPOCH_FINISH_VALUE,
        )?;
        info!(epoch, "[ac-03] Epoch flagged finished");
        Ok(())
    }

    // =========================================================================
    // HEALTH FLAGS
    // =========================================================================

    pub fn is_finalization_disabled(&self, epoch: u64, creator: &ValidatorId) -> EpochStateResult<bool> {
        Ok(self.store().exists(
            Namespace::FinalizationVotingStats,
            &keys::block_creator_health(epoch, creator),
        )?)
    }

    /// Persist the "finalization disabled" flag for a creator.
    pub fn disable_finalization(&self, epoch: u64, creator: &ValidatorId) -> EpochStateResult<()> {
        let key = keys::block_creator_health(epoch, creator);
        if self.store().exists(Namespace::FinalizationVotingStats, &key)? {
            return Ok(());
        }
        let status = BlockCreatorHealthStatus {
            epoch,
            creator: creator.clone(),
        };
        self.store()
            .put_json(Namespace::FinalizationVotingStats, &key, &status)?;
        info!(epoch, creator = %creator, "[ac-03] Finalization disabled for creator");
        Ok(())
    }

    // =========================================================================
    // VOTING STATS
    // =========================================================================

    /// Stored stat, or the empty template when none was recorded.
    pub fn voting_stat(&self, epoch: u64, creator: &ValidatorId) -> EpochStateResult<VotingStat> {
        Ok(self
            .store()
            .get_json(
                Namespace::FinalizationVotingStats,
                &keys::voting_stat(epoch, creator),
            )?
            .unwrap_or_else(VotingStat::template))
    }

    /// Store `stat` unless the stored one has a greater index. Returns
    /// whether the write happened.
    pub fn store_voting_stat(
        &self,
        epoch: u64,
        creator: &ValidatorId,
        stat: &VotingStat,
    ) -> EpochStateResult<bool> {
        let shard = self.stat_lock(epoch, creator);
        let _guard = shard.lock();
        let current = self.voting_stat(epoch, creator)?;
        if current.index > stat.index {
            debug!(
                epoch,
                creator = %creator,
                stored = current.index,
                offered = stat.index,
                "[ac-03] Older voting stat ignored"
            );
            return Ok(false);
        }
        self.store().put_json(
            Namespace::FinalizationVotingStats,
            &keys::voting_stat(epoch, creator),
            stat,
        )?;
        Ok(true)
    }

    /// Batch operation writing a voting stat. Only valid while holding
    /// [`EpochState::stat_lock`] for the same key, after re-reading the
    /// stored stat under it.
    pub fn voting_stat_op(epoch: u64, creator: &ValidatorId, stat: &VotingStat) -> KVResult<BatchOperation> {
        BatchOperation::put_json(
            Namespace::FinalizationVotingStats,
            keys::voting_stat(epoch, creator),
            stat,
        )
    }
}
