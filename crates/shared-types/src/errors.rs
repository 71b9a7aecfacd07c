//! # Error Types
//!
//! Errors shared by every anchors crate: identifier parsing, the key-value
//! store port and outbound peer calls.

use thiserror::Error;

/// Errors raised while parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Block id is not of the form `epoch:creator:index`.
    #[error("Malformed block id: {0}")]
    MalformedBlockId(String),
}

/// Errors raised by a `KeyValueStore` backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// Stored value could not be encoded or decoded.
    #[error("KV store serialization error at {key}: {message}")]
    Serialization { key: String, message: String },

    /// The atomic batch was rejected; nothing was applied.
    #[error("KV store batch commit failed: {message}")]
    BatchCommit { message: String },
}

impl KVStoreError {
    /// Wrap a backend failure as an I/O error.
    pub fn io(message: impl ToString) -> Self {
        KVStoreError::IOError {
            message: message.to_string(),
        }
    }
}

/// Result alias for storage operations.
pub type KVResult<T> = Result<T, KVStoreError>;

/// Failure of a single outbound call to a peer.
///
/// Fan-out loops treat every variant as an abstaining vote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    /// No answer before the per-call deadline.
    #[error("Peer {url} timed out")]
    Timeout { url: String },

    /// Connection or HTTP failure.
    #[error("Transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status.
    #[error("Peer {url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// Peer answered with an `{"err": ...}` body.
    #[error("Peer {url} rejected the request: {message}")]
    Rejected { url: String, message: String },

    /// Body could not be decoded.
    #[error("Undecodable response from {url}: {message}")]
    Decode { url: String, message: String },
}
