//! Error types for epoch rotation.

use ac_03_epoch_state::EpochStateError;
use shared_types::KVStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpochRotationError {
    /// The next-epoch batch was rejected by the store. The in-memory root
    /// was not replaced, but the node cannot safely continue.
    #[error("Epoch {epoch} rotation batch failed to commit: {source}")]
    BatchCommit {
        epoch: u64,
        #[source]
        source: KVStoreError,
    },

    /// Epoch state error
    #[error("Epoch state error: {0}")]
    EpochState(#[from] EpochStateError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl EpochRotationError {
    /// Whether the rotation loop must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EpochRotationError::BatchCommit { .. })
    }
}

pub type EpochRotationResult<T> = Result<T, EpochRotationError>;
