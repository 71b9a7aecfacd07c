//! # Per-Validator Locks
//!
//! Two registries keyed by `(epoch, validator)`, so that work on distinct
//! validators proceeds in parallel:
//!
//! - [`ValidatorLocks`]: async mutexes held across peer round trips by the
//!   rotation collector and proof-acceptance paths.
//! - [`StatLocks`]: synchronous mutexes around every read-check-write of a
//!   voting stat. Never held across an `.await`.
//!
//! When both are needed the async lock is taken first.

use parking_lot::Mutex;
use shared_types::ValidatorId;
use std::collections::HashMap;
use std::sync::Arc;

type LockKey = (u64, ValidatorId);

#[derive(Default)]
pub struct ValidatorLocks {
    locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl ValidatorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex for `(epoch, validator)`, created on first use.
    pub fn get(&self, epoch: u64, validator: &ValidatorId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry((epoch, validator.clone()))
            .or_default()
            .clone()
    }

    /// Drop the mutexes of epochs older than `epoch`.
    pub fn prune_below(&self, epoch: u64) {
        self.locks.lock().retain(|(e, _), _| *e >= epoch);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct StatLocks {
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl StatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, epoch: u64, validator: &ValidatorId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry((epoch, validator.clone()))
            .or_default()
            .clone()
    }

    pub fn prune_below(&self, epoch: u64) {
        self.locks.lock().retain(|(e, _), _| *e >= epoch);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
