//! # Liveness Monitor
//!
//! Raises the persisted "finalization disabled" flag for a creator whose
//! voting stat stopped advancing. Watched creators are the current leader
//! and every registry member with at least one finalized block; members
//! that never produced are left alone.

use crate::error::RotationResult;
use ac_03_epoch_state::EpochState;
use parking_lot::Mutex;
use shared_types::ValidatorId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Last observed stat index per `(epoch, creator)` and when it was first seen.
type Observations = HashMap<(u64, ValidatorId), (i64, u64)>;

pub struct LivenessMonitor {
    state: Arc<EpochState>,
    timeout_ms: u64,
    observed: Mutex<Observations>,
}

impl LivenessMonitor {
    pub fn new(state: Arc<EpochState>, timeout: Duration) -> Self {
        Self {
            state,
            timeout_ms: timeout.as_millis() as u64,
            observed: Mutex::new(HashMap::new()),
        }
    }

    /// Check every watched creator of the current epoch at `now_ms`.
    /// Returns the creators flagged by this call.
    pub fn check(&self, now_ms: u64) -> RotationResult<Vec<ValidatorId>> {
        let epoch = self.state.current_epoch();
        if self.state.is_epoch_finished(epoch.id)? {
            return Ok(Vec::new());
        }

        let mut flagged = Vec::new();
        let mut observed = self.observed.lock();
        observed.retain(|(e, _), _| *e == epoch.id);

        for creator in &epoch.validators_registry {
            if self.state.is_finalization_disabled(epoch.id, creator)? {
                continue;
            }
            let stat = self.state.voting_stat(epoch.id, creator)?;
            if stat.is_empty() && epoch.current_leader() != Some(creator) {
                continue;
            }

            let entry = observed
                .entry((epoch.id, creator.clone()))
                .or_insert((stat.index, now_ms));
            if entry.0 != stat.index {
                *entry = (stat.index, now_ms);
                continue;
            }
            if now_ms.saturating_sub(entry.1) > self.timeout_ms {
                self.state.disable_finalization(epoch.id, creator)?;
                info!(
                    epoch = epoch.id,
                    creator = %creator,
                    index = stat.index,
                    "[ac-06] Creator stalled"
                );
                flagged.push(creator.clone());
            }
        }
        Ok(flagged)
    }

    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.check(shared_types::time::now_ms()) {
                warn!(error = %e, "[ac-06] Liveness check failed");
            }
        }
    }
}
