//! Epoch Rotation - the rotation loop
//!
//! One tick reads the root under the shared lock, flags the epoch finished
//! once its window elapsed and, when the first block of the epoch is
//! settled, commits the next epoch under the exclusive lock.


use crate::domain::delayed::{
    partition_delayed_transactions, verify_delayed_batch, BatchVerdict, DelayedPartition,
};
use crate::domain::next_epoch::{next_epoch, next_epoch_data};
use crate::error::{EpochRotationError, EpochRotationResult};
use ac_01_block_model::{Block, BlockFetcher};
use ac_03_epoch_state::EpochState;
use parking_lot::Mutex;
use shared_types::{
    keys, ApprovementThreadMetadataHandler, BatchOperation, BlockId, DelayedTransactionsBatch,
    EpochDataHandler, FirstBlockAssumption, JsonStoreExt, Namespace,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What is known about the first block of the epoch being closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FirstBlock {
    /// No assumption was recorded; the epoch closes on its own hash.
    Unassumed,
    /// Assumption recorded but the block is not fetched or not confirmed yet.
    Pending,
    /// Block fetched and its hash matches the assumption.
    Confirmed(Block),
}

/// Result of one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Epoch window still open.
    Fresh,
    /// Epoch finished, waiting for its first block.
    Waiting { epoch: u64 },
    /// Next epoch committed and installed.
    Rotated {
        from: u64,
        to: u64,
        executed: Option<DelayedPartition>,
    },
}

pub struct EpochRotation {
    state: Arc<EpochState>,
    fetcher: Arc<BlockFetcher>,
    last_execution: Mutex<Option<(u64, DelayedPartition)>>,
}

impl EpochRotation {
    pub fn new(state: Arc<EpochState>, fetcher: Arc<BlockFetcher>) -> Self {
        Self {
            state,
            fetcher,
            last_execution: Mutex::new(None),
        }
    }

    /// Epoch and partition of the last executed delayed batch.
    pub fn last_execution(&self) -> Option<(u64, DelayedPartition)> {
        self.last_execution.lock().clone()
    }

    pub async fn tick(&self, now_ms: u64) -> EpochRotationResult<TickOutcome> {
        let (epoch, params) = {
            let root = self.state.read();
            (root.epoch.clone(), root.network_parameters.clone())
        };
        if epoch.is_fresh(&params, now_ms) {
            return Ok(TickOutcome::Fresh);
        }

        if !self.state.is_epoch_finished(epoch.id)? {
            self.state.mark_epoch_finished(epoch.id)?;
        }

        let first_block = self.resolve_first_block(&epoch).await?;
        let (first_block_hash, executed) = match &first_block {
            FirstBlock::Pending => return Ok(TickOutcome::Waiting { epoch: epoch.id }),
            FirstBlock::Unassumed => (None, None),
            FirstBlock::Confirmed(block) => {
                let executed = match block.extra_data.delayed_transactions_batch() {
                    Some(batch) => self.check_batch(batch, &epoch)?,
                    None => None,
                };
                (Some(block.hash(self.state.network_id())), executed)
            }
        };

        self.rotate(&epoch, first_block_hash.as_deref(), executed)
    }

    /// Look up the first block of `epoch` through the recorded assumption.
    pub async fn resolve_first_block(
        &self,
        epoch: &EpochDataHandler,
    ) -> EpochRotationResult<FirstBlock> {
        let assumption: Option<FirstBlockAssumption> = self
            .state
            .store()
            .get_json(Namespace::EpochData, &keys::first_block_assumption(epoch.id))?;
        let Some(assumption) = assumption else {
            return Ok(FirstBlock::Unassumed);
        };

        let Some(creator) = epoch
            .leaders_sequence
            .get(assumption.index_of_first_block_creator)
        else {
            warn!(
                epoch = epoch.id,
                position = assumption.index_of_first_block_creator,
                "[ac-08] First block assumption points outside the leader sequence"
            );
            return Ok(FirstBlock::Unassumed);
        };

        let id = BlockId::new(epoch.id, creator.clone(), 0);
        let urls: Vec<String> = self
            .state
            .quorum_members(epoch)
            .into_iter()
            .map(|member| member.url)
            .collect();

        let expected = &assumption.afp_for_second_block.prev_block_hash;
        match self.fetcher.get_block(&id, &urls).await {
            Some(block) if block.hash(self.state.network_id()) == *expected => {
                Ok(FirstBlock::Confirmed(block))
            }
            Some(_) => {
                warn!(block_id = %id, "[ac-08] First block hash does not match the assumption");
                Ok(FirstBlock::Pending)
            }
            None => {
                debug!(block_id = %id, "[ac-08] First block not available yet");
                Ok(FirstBlock::Pending)
            }
        }
    }

    fn check_batch(
        &self,
        batch: &DelayedTransactionsBatch,
        epoch: &EpochDataHandler,
    ) -> EpochRotationResult<Option<DelayedPartition>> {
        let latest: Option<u64> = self
            .state
            .store()
            .get_json(Namespace::State, keys::LATEST_BATCH_INDEX)?;

        match verify_delayed_batch(batch, epoch, latest) {
            BatchVerdict::Apply => Ok(Some(partition_delayed_transactions(
                &batch.delayed_transactions,
            ))),
            verdict => {
                debug!(epoch = epoch.id, ?verdict, "[ac-08] Delayed batch skipped");
                Ok(None)
            }
        }
    }

    fn rotate(
        &self,
        epoch: &EpochDataHandler,
        first_block_hash: Option<&str>,
        executed: Option<DelayedPartition>,
    ) -> EpochRotationResult<TickOutcome> {
        let writer = self.state.write_paused();
        let root = writer.root().clone();
        if root.epoch.id != epoch.id {
            return Ok(TickOutcome::Fresh);
        }

        let next = next_epoch(&root.epoch, &root.network_parameters, first_block_hash);
        let next_root = ApprovementThreadMetadataHandler {
            epoch: next.clone(),
            ..root.clone()
        };

        let mut ops = vec![BatchOperation::put_json(
            Namespace::EpochData,
            keys::epoch_handler(root.epoch.id),
            &root.epoch,
        )?];
        ops.extend(self.state.validator_cache().flush_ops()?);
        ops.push(BatchOperation::put_json(
            Namespace::ApprovementThread,
            keys::next_epoch_data(next.id),
            &next_epoch_data(&next),
        )?);
        ops.push(BatchOperation::put_json(
            Namespace::EpochData,
            keys::epoch_handler(next.id),
            &next,
        )?);
        ops.push(BatchOperation::put_json(
            Namespace::ApprovementThread,
            keys::APPROVEMENT_THREAD,
            &next_root,
        )?);
        if executed.is_some() {
            ops.push(BatchOperation::put_json(
                Namespace::State,
                keys::LATEST_BATCH_INDEX,
                &root.epoch.id,
            )?);
        }

        if let Err(source) = self.state.store().atomic_batch_write(ops) {
            error!(epoch = root.epoch.id, error = %source, "[ac-08] Rotation batch failed to commit");
            return Err(EpochRotationError::BatchCommit {
                epoch: root.epoch.id,
                source,
            });
        }

        self.state.validator_cache().clear();
        writer.install(&self.state, next_root);

        if let Some(partition) = &executed {
            *self.last_execution.lock() = Some((root.epoch.id, partition.clone()));
        }
        info!(
            from = root.epoch.id,
            to = next.id,
            hash = %next.hash,
            leader = ?next.current_leader(),
            delayed = executed.as_ref().map_or(0, DelayedPartition::len),
            "[ac-08] Epoch rotated"
        );

        Ok(TickOutcome::Rotated {
            from: root.epoch.id,
            to: next.id,
            executed,
        })
    }

    /// Tick until a fatal error. Non-fatal failures are logged and retried.
    pub async fn run(self: Arc<Self>, interval: Duration) -> EpochRotationError {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.tick(shared_types::time::now_ms()).await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return e,
                Err(e) => warn!(error = %e, "[ac-08] Rotation tick failed"),
            }
        }
    }
}
