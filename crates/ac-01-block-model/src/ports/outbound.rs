//! # Outbound Ports
//!
//! Production: `HttpPeerClient` in node-runtime (`GET <url>/block/<id>`).
//! Testing: in-memory mocks.

use crate::domain::block::Block;
use async_trait::async_trait;
use shared_types::PeerError;

/// A remote node that can serve blocks by id.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch a block from the node at `peer_url`. `Ok(None)` means the peer
    /// does not have it.
    async fn fetch_block(&self, peer_url: &str, block_id: &str) -> Result<Option<Block>, PeerError>;
}
