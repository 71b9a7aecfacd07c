//! Error types for the epoch state.

use shared_types::KVStoreError;
use thiserror::Error;

/// Epoch state errors
#[derive(Debug, Error)]
pub enum EpochStateError {
    /// Routes are paused while the root is being rewritten.
    #[error("Routes are temporarily paused for an epoch rotation")]
    RoutesPaused,

    /// Epoch is neither current nor previous.
    #[error("Epoch {0} is not tracked")]
    UntrackedEpoch(u64),

    /// Genesis has no validators.
    #[error("Genesis validator list is empty")]
    EmptyGenesis,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

/// Result type for epoch state operations
pub type EpochStateResult<T> = Result<T, EpochStateError>;
