//! Error types for proof acceptance.

use ac_02_quorum_selection::QuorumError;
use ac_03_epoch_state::EpochStateError;
use shared_types::{KVStoreError, ValidatorId};
use thiserror::Error;

/// Proof acceptance errors
#[derive(Debug, Error)]
pub enum ProofError {
    /// Epoch is neither current nor previous.
    #[error("Epoch {0} is not tracked")]
    UntrackedEpoch(u64),

    /// Subject is not in the epoch registry.
    #[error("{subject} is not part of epoch {epoch}")]
    UnknownSubject { epoch: u64, subject: ValidatorId },

    /// Fewer signatures than required.
    #[error("Insufficient signatures: {have} < {need}")]
    InsufficientSignatures { have: usize, need: usize },

    /// Batch carried no proofs.
    #[error("Empty proof batch")]
    EmptyBatch,

    /// Signature map is empty.
    #[error("Missing signatures")]
    MissingSignatures,

    /// Voting stat is the empty template or has no hash.
    #[error("Invalid voting stat")]
    InvalidVotingStat,

    /// Embedded AFP does not certify the voting stat.
    #[error("Invalid embedded AFP: {0}")]
    InvalidAfp(#[from] QuorumError),

    /// Epoch state error
    #[error("Epoch state error: {0}")]
    EpochState(#[from] EpochStateError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

/// Result type for proof acceptance
pub type ProofResult<T> = Result<T, ProofError>;
