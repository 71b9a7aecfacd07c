//! # Proof Acceptor
//!
//! Shared acceptance path of both proof families:
//!
//! ```text
//! precheck ──→ lock (epoch, subject) ──→ validate ──→ on_validated
//!          ──→ stored proof covers it? ──yes──→ re-add stored proof to mempool
//!                                      └─no──→ store proof, add to mempool
//! ```

mod payload;

pub use payload::ProofPools;

use crate::domain::mempool::ProofMempool;
use crate::domain::policy::ValidationPolicy;
use crate::domain::proof::AggregatedProof;
use crate::error::{ProofError, ProofResult};
use ac_03_epoch_state::EpochState;
use shared_types::{JsonStoreExt, Namespace};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to an accepted proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The proof was stored and added to the mempool.
    Stored,
    /// An equal-or-fresher stored proof was re-added instead.
    AlreadyKnown,
}

pub struct ProofAcceptor<P, V> {
    state: Arc<EpochState>,
    mempool: Arc<ProofMempool<P>>,
    policy: V,
    _proof: PhantomData<fn(P)>,
}

impl<P, V> ProofAcceptor<P, V>
where
    P: AggregatedProof,
    V: ValidationPolicy<P>,
{
    pub fn new(state: Arc<EpochState>, mempool: Arc<ProofMempool<P>>, policy: V) -> Self {
        Self {
            state,
            mempool,
            policy,
            _proof: PhantomData,
        }
    }

    pub fn mempool(&self) -> &Arc<ProofMempool<P>> {
        &self.mempool
    }

    pub async fn accept(&self, proof: P) -> ProofResult<AcceptOutcome> {
        self.policy.precheck(&proof)?;

        let lock = self
            .state
            .locks()
            .get(proof.epoch_index(), proof.subject());
        let _guard = lock.lock().await;

        self.policy.validate(&proof)?;
        self.policy.on_validated(&proof)?;

        let key = proof.storage_key();
        let existing: Option<P> = self
            .state
            .store()
            .get_json(Namespace::FinalizationVotingStats, &key)?;
        if let Some(existing) = existing {
            if existing.voting_stat().covers(proof.voting_stat()) {
                debug!(
                    kind = P::KIND,
                    epoch = proof.epoch_index(),
                    subject = %proof.subject(),
                    "[ac-04] Stored proof already covers the offered one"
                );
                self.mempool.add(existing);
                return Ok(AcceptOutcome::AlreadyKnown);
            }
        }

        self.state
            .store()
            .put_json(Namespace::FinalizationVotingStats, &key, &proof)?;
        info!(
            kind = P::KIND,
            epoch = proof.epoch_index(),
            subject = %proof.subject(),
            index = proof.voting_stat().index,
            "[ac-04] Proof accepted"
        );
        self.mempool.add(proof);
        Ok(AcceptOutcome::Stored)
    }

    /// Transport entry point: accept every proof in order, stopping at the
    /// first rejection. Refused while routes are paused. Returns the number
    /// accepted.
    pub async fn accept_batch(&self, proofs: Vec<P>) -> ProofResult<usize> {
        self.state.ensure_routes_open()?;
        if proofs.is_empty() {
            return Err(ProofError::EmptyBatch);
        }
        let mut accepted = 0;
        for proof in proofs {
            self.accept(proof).await?;
            accepted += 1;
        }
        Ok(accepted)
    }
}
