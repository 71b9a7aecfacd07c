//! Error types for the block model.

use shared_types::KVStoreError;
use thiserror::Error;

/// Block model errors
#[derive(Debug, Error)]
pub enum BlockError {
    /// Epoch reference is not of the form `hash#id`.
    #[error("Malformed epoch full id: {0}")]
    MalformedEpochFullId(String),

    /// Signature does not verify against the claimed creator.
    #[error("Invalid block signature for {block_id}")]
    InvalidSignature { block_id: String },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

/// Result type for block operations
pub type BlockResult<T> = Result<T, BlockError>;
