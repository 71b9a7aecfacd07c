//! # Outbound Ports
//!
//! Production: `HttpPeerClient` in node-runtime
//! (`POST <url>/anchor_rotation_proof`, `POST <url>/accept_extra_data`).

use crate::domain::messages::{
    AcceptRotationProofsRequest, AnchorRotationProofRequest, AnchorRotationProofResponse,
};
use async_trait::async_trait;
use shared_types::PeerError;

#[async_trait]
pub trait RotationPeer: Send + Sync {
    /// Ask a quorum member to sign the rotation message for a proposal.
    async fn request_rotation_signature(
        &self,
        peer_url: &str,
        request: &AnchorRotationProofRequest,
    ) -> Result<AnchorRotationProofResponse, PeerError>;

    /// Hand collected proofs to a peer. Returns how many it accepted.
    async fn broadcast_rotation_proofs(
        &self,
        peer_url: &str,
        request: &AcceptRotationProofsRequest,
    ) -> Result<usize, PeerError>;
}
