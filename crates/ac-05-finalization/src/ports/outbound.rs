//! # Outbound Ports
//!
//! Production: `HttpPeerClient` in node-runtime (`POST <url>/finalization_proof`).
//! Testing: in-process mocks wired to real `FinalizationService`s.

use crate::domain::messages::{FinalizationRequest, FinalizationVote};
use async_trait::async_trait;
use shared_types::PeerError;

/// A quorum member that can be asked for a finalization vote.
#[async_trait]
pub trait FinalizationPeer: Send + Sync {
    /// `Ok(None)` means the peer declined to vote.
    async fn request_finalization(
        &self,
        peer_url: &str,
        request: &FinalizationRequest,
    ) -> Result<Option<FinalizationVote>, PeerError>;
}
