//! Epoch State - the consensus root
//!
//! Owns the `ApprovementThreadMetadataHandler` behind a single read/write
//! lock, the previous epoch's snapshot, the routes gate, the validator
//! storage cache and the per-validator lock registries.
//!
//! The in-memory root is a cache of `AT`; it is rebuilt from the store at
//! startup and only replaced after a batch containing the new `AT` commits.

mod records;

use crate::domain::cache::ValidatorStorageCache;
use crate::domain::genesis::Genesis;
use crate::domain::locks::{StatLocks, ValidatorLocks};
use crate::domain::routes::{RoutesGate, RoutesPause};
use crate::error::{EpochStateError, EpochStateResult};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use shared_types::{
    keys, ApprovementThreadMetadataHandler, BatchOperation, EpochDataHandler, JsonStoreExt,
    KeyValueStore, Namespace, NetworkParameters, QuorumMember, ValidatorId, ValidatorStorage,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct EpochState {
    network_id: String,
    store: Arc<dyn KeyValueStore>,
    root: RwLock<ApprovementThreadMetadataHandler>,
    previous_epoch: RwLock<Option<EpochDataHandler>>,
    validator_cache: ValidatorStorageCache,
    routes: RoutesGate,
    locks: ValidatorLocks,
    stat_locks: StatLocks,
}

impl EpochState {
    /// Reload `AT` from the store, or write the genesis state on first start.
    pub fn bootstrap(store: Arc<dyn KeyValueStore>, genesis: &Genesis) -> EpochStateResult<Self> {
        let existing: Option<ApprovementThreadMetadataHandler> =
            store.get_json(Namespace::ApprovementThread, keys::APPROVEMENT_THREAD)?;

        let root = match existing {
            Some(root) => {
                info!(
                    epoch = root.epoch.id,
                    hash = %root.epoch.hash,
                    "[ac-03] Approvement thread reloaded"
                );
                root
            }
            None => Self::write_genesis(store.as_ref(), genesis)?,
        };

        let previous_epoch = match root.epoch.id.checked_sub(1) {
            Some(prev) => store.get_json(Namespace::EpochData, &keys::epoch_handler(prev))?,
            None => None,
        };

        Ok(Self {
            network_id: genesis.network_id.clone(),
            store,
            root: RwLock::new(root),
            previous_epoch: RwLock::new(previous_epoch),
            validator_cache: ValidatorStorageCache::new(),
            routes: RoutesGate::new(),
            locks: ValidatorLocks::new(),
            stat_locks: StatLocks::new(),
        })
    }

    fn write_genesis(
        store: &dyn KeyValueStore,
        genesis: &Genesis,
    ) -> EpochStateResult<ApprovementThreadMetadataHandler> {
        if genesis.validators.is_empty() {
            return Err(EpochStateError::EmptyGenesis);
        }
        let root = genesis.root_handler();

        let mut ops = Vec::with_capacity(genesis.validators.len() + 2);
        for validator in &genesis.validators {
            ops.push(BatchOperation::put_json(
                Namespace::ApprovementThread,
                keys::validator_storage(&validator.pubkey),
                validator,
            )?);
        }
        ops.push(BatchOperation::put_json(
            Namespace::EpochData,
            keys::epoch_handler(root.epoch.id),
            &root.epoch,
        )?);
        ops.push(BatchOperation::put_json(
            Namespace::ApprovementThread,
            keys::APPROVEMENT_THREAD,
            &root,
        )?);
        store.atomic_batch_write(ops)?;

        info!(
            network = %genesis.network_id,
            validators = genesis.validators.len(),
            epoch_hash = %root.epoch.hash,
            "[ac-03] Genesis state written"
        );
        Ok(root)
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn routes(&self) -> &RoutesGate {
        &self.routes
    }

    pub fn locks(&self) -> &ValidatorLocks {
        &self.locks
    }

    /// Mutex serializing every read-check-write of the voting stat of
    /// `(epoch, creator)`. Writers holding it must not call
    /// [`EpochState::store_voting_stat`].
    pub fn stat_lock(&self, epoch: u64, creator: &ValidatorId) -> Arc<Mutex<()>> {
        self.stat_locks.get(epoch, creator)
    }

    pub fn validator_cache(&self) -> &ValidatorStorageCache {
        &self.validator_cache
    }

    // =========================================================================
    // ROOT ACCESS
    // =========================================================================

    /// Shared read access for internal tasks.
    pub fn read(&self) -> RwLockReadGuard<'_, ApprovementThreadMetadataHandler> {
        self.root.read()
    }

    /// Admission check for every transport-facing entry point.
    pub fn ensure_routes_open(&self) -> EpochStateResult<()> {
        if !self.routes.is_open() {
            return Err(EpochStateError::RoutesPaused);
        }
        Ok(())
    }

    /// Shared read access for transport handlers; refused while the routes
    /// gate is closed.
    pub fn read_for_route(
        &self,
    ) -> EpochStateResult<RwLockReadGuard<'_, ApprovementThreadMetadataHandler>> {
        self.ensure_routes_open()?;
        Ok(self.root.read())
    }

    /// Close the routes gate, then take the exclusive lock. The gate
    /// re-opens when the returned pause guard is dropped, after the write
    /// guard.
    pub fn write_paused(&self) -> RootWriter<'_> {
        let pause = self.routes.pause();
        let guard = self.root.write();
        RootWriter {
            guard,
            _pause: pause,
        }
    }

    pub fn current_epoch(&self) -> EpochDataHandler {
        self.root.read().epoch.clone()
    }

    pub fn network_parameters(&self) -> NetworkParameters {
        self.root.read().network_parameters.clone()
    }

    /// Current or previous epoch snapshot.
    pub fn tracked_epoch(&self, id: u64) -> Option<EpochDataHandler> {
        {
            let root = self.root.read();
            if root.epoch.id == id {
                return Some(root.epoch.clone());
            }
        }
        self.previous_epoch
            .read()
            .as_ref()
            .filter(|e| e.id == id)
            .cloned()
    }

    /// Current epoch first, then the previous one when known.
    pub fn tracked_epochs(&self) -> Vec<EpochDataHandler> {
        let mut epochs = vec![self.current_epoch()];
        if let Some(prev) = self.previous_epoch.read().as_ref() {
            epochs.push(prev.clone());
        }
        epochs
    }

    pub fn require_tracked_epoch(&self, id: u64) -> EpochStateResult<EpochDataHandler> {
        self.tracked_epoch(id)
            .ok_or(EpochStateError::UntrackedEpoch(id))
    }

    // =========================================================================
    // VALIDATOR STORAGE
    // =========================================================================

    /// Read-through lookup of a validator record.
    pub fn validator_storage(&self, pubkey: &ValidatorId) -> EpochStateResult<Option<ValidatorStorage>> {
        if let Some(cached) = self.validator_cache.get(pubkey) {
            return Ok(Some(cached));
        }
        let stored: Option<ValidatorStorage> = self
            .store
            .get_json(Namespace::ApprovementThread, &keys::validator_storage(pubkey))?;
        if let Some(storage) = &stored {
            self.validator_cache.insert(storage.clone());
        }
        Ok(stored)
    }

    /// Quorum members of `epoch` with their URLs. Members without a record
    /// are skipped.
    pub fn quorum_members(&self, epoch: &EpochDataHandler) -> Vec<QuorumMember> {
        epoch
            .quorum
            .iter()
            .filter_map(|pubkey| match self.validator_storage(pubkey) {
                Ok(Some(storage)) => Some(QuorumMember {
                    pubkey: pubkey.clone(),
                    url: storage.url,
                }),
                Ok(None) => None,
                Err(e) => {
                    warn!(validator = %pubkey, error = %e, "[ac-03] Validator storage read failed");
                    None
                }
            })
            .collect()
    }
}

/// Exclusive access to the root while routes are paused.
pub struct RootWriter<'a> {
    guard: RwLockWriteGuard<'a, ApprovementThreadMetadataHandler>,
    _pause: RoutesPause<'a>,
}

impl RootWriter<'_> {
    pub fn root(&self) -> &ApprovementThreadMetadataHandler {
        &self.guard
    }

    /// Replace the root after its batch committed. The outgoing epoch becomes
    /// the previous tracked epoch.
    pub fn install(self, state: &EpochState, next: ApprovementThreadMetadataHandler) {
        let RootWriter { mut guard, _pause } = self;
        let outgoing = std::mem::replace(&mut *guard, next);
        *state.previous_epoch.write() = Some(outgoing.epoch);
        let oldest = guard.epoch.id.saturating_sub(1);
        state.locks.prune_below(oldest);
        state.stat_locks.prune_below(oldest);
        drop(guard);
    }
}
