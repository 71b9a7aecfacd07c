//! # Proof Mempool
//!
//! Keyed map of proofs waiting to be drained into a block. Same key means
//! last write wins; there is no ordering across keys.

use super::proof::AggregatedProof;
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct ProofMempool<P> {
    entries: Mutex<HashMap<String, P>>,
}

impl<P: AggregatedProof> ProofMempool<P> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the slot of `proof`.
    pub fn add(&self, proof: P) {
        self.entries.lock().insert(proof.mempool_key(), proof);
    }

    /// Take every entry, leaving the mempool empty. Empty when nothing was
    /// pending.
    pub fn drain(&self) -> Vec<P> {
        let drained = std::mem::take(&mut *self.entries.lock());
        drained.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: AggregatedProof> Default for ProofMempool<P> {
    fn default() -> Self {
        Self::new()
    }
}
