//! Error types for the anchor-rotation responder.

use ac_02_quorum_selection::QuorumError;
use ac_03_epoch_state::EpochStateError;
use shared_types::{KVStoreError, ValidatorId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotationError {
    /// Epoch is neither current nor previous.
    #[error("Epoch {0} is not tracked")]
    UntrackedEpoch(u64),

    /// Creator is not in the epoch registry.
    #[error("{creator} is not part of epoch {epoch}")]
    UnknownCreator { epoch: u64, creator: ValidatorId },

    /// Epoch flagged finished; no new rotation signatures.
    #[error("Epoch {0} is finished")]
    EpochFinished(u64),

    /// Proposal is the empty template or has no hash.
    #[error("Invalid proposal")]
    InvalidProposal,

    /// Proposal's embedded AFP does not certify it.
    #[error("Proposal AFP rejected: {0}")]
    ProposalAfp(#[from] QuorumError),

    /// Epoch state error
    #[error("Epoch state error: {0}")]
    EpochState(#[from] EpochStateError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

pub type RotationResult<T> = Result<T, RotationError>;
