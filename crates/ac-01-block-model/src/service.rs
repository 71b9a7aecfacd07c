//! Block Fetcher - read-through block retrieval
//!
//! Local store first. On a miss, one request per known peer (quorum members
//! plus bootstrap nodes, excluding this node) races under a per-call
//! timeout; the first well-formed block for the requested id wins.

use crate::domain::block::Block;
use crate::error::BlockResult;
use crate::ports::outbound::BlockSource;
use futures::stream::{FuturesUnordered, StreamExt};
use shared_types::{BlockId, JsonStoreExt, KeyValueStore, Namespace, PeerError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Block fetcher configuration
#[derive(Clone, Debug)]
pub struct BlockFetcherConfig {
    /// URL under which peers reach this node; never queried.
    pub my_hostname: String,
    /// Bootstrap node URLs, always queried on a miss.
    pub bootstrap_nodes: Vec<String>,
    /// Per-peer request timeout.
    pub request_timeout: Duration,
}

impl Default for BlockFetcherConfig {
    fn default() -> Self {
        Self {
            my_hostname: String::new(),
            bootstrap_nodes: Vec::new(),
            request_timeout: Duration::from_secs(1),
        }
    }
}

pub struct BlockFetcher {
    config: BlockFetcherConfig,
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn BlockSource>,
}

impl BlockFetcher {
    pub fn new(
        config: BlockFetcherConfig,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn BlockSource>,
    ) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Block from the local store only.
    pub fn load_local(&self, id: &BlockId) -> BlockResult<Option<Block>> {
        Ok(self.store.get_json(Namespace::Blocks, &id.to_string())?)
    }

    /// Local store, then the peer race. `None` when nobody has the block.
    pub async fn get_block(&self, id: &BlockId, quorum_urls: &[String]) -> Option<Block> {
        match self.load_local(id) {
            Ok(Some(block)) => return Some(block),
            Ok(None) => {}
            Err(e) => warn!(block_id = %id, error = %e, "[ac-01] Local block read failed"),
        }

        let block_id = id.to_string();
        let peers = self.peer_urls(quorum_urls);
        if peers.is_empty() {
            return None;
        }

        let mut requests: FuturesUnordered<_> = peers
            .iter()
            .map(|url| self.fetch_from(url, &block_id))
            .collect();

        while let Some(result) = requests.next().await {
            match result {
                Ok(Some(block)) if block.creator == id.creator && block.index == id.index => {
                    debug!(block_id = %id, "[ac-01] Block fetched from peer");
                    return Some(block);
                }
                Ok(Some(_)) => debug!(block_id = %id, "[ac-01] Peer returned a different block"),
                Ok(None) => {}
                Err(e) => debug!(block_id = %id, error = %e, "[ac-01] Peer fetch failed"),
            }
        }
        None
    }

    async fn fetch_from(&self, url: &str, block_id: &str) -> Result<Option<Block>, PeerError> {
        match tokio::time::timeout(
            self.config.request_timeout,
            self.source.fetch_block(url, block_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PeerError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    fn peer_urls(&self, quorum_urls: &[String]) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for url in quorum_urls.iter().chain(self.config.bootstrap_nodes.iter()) {
            if url.is_empty() || *url == self.config.my_hostname || urls.contains(url) {
                continue;
            }
            urls.push(url.clone());
        }
        urls
    }
}
