//! Error types for quorum selection and AFP verification.

use thiserror::Error;

/// Reasons an aggregated finalization proof is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    /// Fewer verified quorum signatures than the majority.
    #[error("Insufficient attestations: have {have}, need {need}")]
    InsufficientAttestations { have: usize, need: usize },

    /// The proof certifies a different block than the one referenced.
    #[error("AFP references block {actual}, expected {expected}")]
    BlockIdMismatch { expected: String, actual: String },

    /// The proof's block hash differs from the referenced hash.
    #[error("AFP block hash mismatch for {block_id}")]
    BlockHashMismatch { block_id: String },

    /// The quorum is empty; no proof can ever verify.
    #[error("Empty quorum")]
    EmptyQuorum,
}

/// Result type for quorum operations
pub type QuorumResult<T> = Result<T, QuorumError>;
