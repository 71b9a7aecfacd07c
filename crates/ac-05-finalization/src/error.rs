//! Error types for the finalization protocol.
//!
//! Every variant except `Storage` is a validation failure: the caller
//! answers "no vote".

use ac_01_block_model::BlockError;
use ac_02_quorum_selection::QuorumError;
use ac_03_epoch_state::EpochStateError;
use shared_types::{IdError, KVStoreError, ValidatorId};
use thiserror::Error;

/// Finalization errors
#[derive(Debug, Error)]
pub enum FinalizationError {
    /// Creator is not the current leader-sequence entry.
    #[error("{creator} is not the current leader")]
    NotLeader { creator: ValidatorId },

    /// Block references another epoch.
    #[error("Block epoch {actual} does not match current epoch {expected}")]
    WrongEpoch { expected: String, actual: String },

    /// Finalization is disabled for the creator in this epoch.
    #[error("Finalization disabled for {creator}")]
    CreatorDisabled { creator: ValidatorId },

    /// Block signature does not verify against its creator.
    #[error("Invalid block signature")]
    InvalidBlockSignature,

    /// Epoch already flagged finished.
    #[error("Epoch {0} is finished")]
    EpochFinished(u64),

    /// Block does not continue the locally recorded segment.
    #[error("Stale index: local voting stat at {local}, offered {offered}")]
    StaleIndex { local: i64, offered: u64 },

    /// A different block is already stored under this id.
    #[error("Conflicting block already stored for {block_id}")]
    Equivocation { block_id: String },

    /// Block 0 must chain to `ZERO_HASH`.
    #[error("First block of a segment must reference the zero hash, got {prev_hash}")]
    FirstBlockPrevHash { prev_hash: String },

    /// Index above zero without a proof for the previous block.
    #[error("Missing AFP for the previous block")]
    MissingPreviousAfp,

    /// Proof for the previous block does not verify or link.
    #[error("Invalid AFP for the previous block: {0}")]
    InvalidPreviousAfp(#[from] QuorumError),

    /// Malformed identifier.
    #[error("Malformed identifier: {0}")]
    MalformedId(#[from] IdError),

    /// Block model error
    #[error("Block error: {0}")]
    Block(#[from] BlockError),

    /// Epoch state error
    #[error("Epoch state error: {0}")]
    EpochState(#[from] EpochStateError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

/// Result type for finalization operations
pub type FinalizationResult<T> = Result<T, FinalizationError>;
