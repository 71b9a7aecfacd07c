//! # Anchors Node
//!
//! ```text
//!                      ┌──────────── EpochState ────────────┐
//!                      │  AT root · routes gate · caches    │
//!                      └────────────────────────────────────┘
//!   inbound services              │            background tasks
//!   ─────────────────             │            ────────────────
//!   FinalizationService ──────────┤──────────  BlockProposer
//!   RotationService ──────────────┤──────────  RotationCollector
//!   LeaderFinalizationService ────┤──────────  LivenessMonitor
//!                                 └──────────  EpochRotation (fatal on commit failure)
//! ```
//!
//! Inbound services are the entry points a transport layer calls into; the
//! background tasks reach peers through [`Peers`].

use crate::container::config::NodeConfig;
use ac_01_block_model::{BlockFetcher, BlockFetcherConfig, BlockSource};
use ac_03_epoch_state::{EpochState, Genesis};
use ac_04_proof_mempool::ProofPools;
use ac_05_finalization::{BlockProposer, FinalizationPeer, FinalizationService, ProposerConfig};
use ac_06_anchor_rotation::{
    CollectorConfig, LivenessMonitor, RotationCollector, RotationPeer, RotationService,
};
use ac_07_leader_finalization::LeaderFinalizationService;
use ac_08_epoch_rotation::{EpochRotation, EpochRotationError};
use anyhow::{Context, Result};
use shared_crypto::NodeIdentity;
use shared_types::{KeyValueStore, ValidatorId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Outbound transport, one handle per port.
#[derive(Clone)]
pub struct Peers {
    pub blocks: Arc<dyn BlockSource>,
    pub finalization: Arc<dyn FinalizationPeer>,
    pub rotation: Arc<dyn RotationPeer>,
}

impl Peers {
    /// All ports served by one client.
    pub fn uniform<C>(client: Arc<C>) -> Self
    where
        C: BlockSource + FinalizationPeer + RotationPeer + 'static,
    {
        Self {
            blocks: client.clone(),
            finalization: client.clone(),
            rotation: client,
        }
    }
}

pub struct AnchorsNode {
    pub config: NodeConfig,
    pub validator_id: ValidatorId,
    pub state: Arc<EpochState>,
    pub pools: ProofPools,
    pub fetcher: Arc<BlockFetcher>,
    pub finalization: Arc<FinalizationService>,
    pub rotation: Arc<RotationService>,
    pub leader_finalization: Arc<LeaderFinalizationService>,
    peers: Peers,
}

impl AnchorsNode {
    /// Bootstrap the epoch state from `store` and wire every service.
    pub fn assemble(
        config: NodeConfig,
        identity: NodeIdentity,
        store: Arc<dyn KeyValueStore>,
        genesis: &Genesis,
        peers: Peers,
    ) -> Result<Self> {
        let state = Arc::new(
            EpochState::bootstrap(store.clone(), genesis).context("Failed to bootstrap epoch state")?,
        );
        let validator_id = ValidatorId::from(identity.public_key());
        if !state.current_epoch().in_registry(&validator_id) {
            warn!(validator = %validator_id, "Node key is not in the validator registry");
        }

        let identity = Arc::new(identity);
        let pools = ProofPools::new();
        let fetcher = Arc::new(BlockFetcher::new(
            BlockFetcherConfig {
                my_hostname: config.network.my_hostname.clone(),
                bootstrap_nodes: config.network.bootstrap_nodes.clone(),
                request_timeout: config.network.block_fetch_timeout,
            },
            store,
            peers.blocks.clone(),
        ));

        let finalization = Arc::new(FinalizationService::new(state.clone(), identity.clone()));
        let rotation = Arc::new(RotationService::new(
            state.clone(),
            identity,
            pools.rotation.clone(),
        ));
        let leader_finalization = Arc::new(LeaderFinalizationService::new(
            state.clone(),
            pools.leader_finalization.clone(),
        ));

        let epoch = state.current_epoch();
        info!(
            validator = %validator_id,
            epoch = epoch.id,
            quorum = epoch.quorum.len(),
            "Anchors node assembled"
        );

        Ok(Self {
            config,
            validator_id,
            state,
            pools,
            fetcher,
            finalization,
            rotation,
            leader_finalization,
            peers,
        })
    }

    /// Start the proposer, collector, liveness monitor and rotation loop.
    pub fn spawn_background_tasks(&self) -> BackgroundTasks {
        let network = &self.config.network;
        let timing = &self.config.timing;

        let proposer = Arc::new(BlockProposer::new(
            self.state.clone(),
            self.finalization.clone(),
            self.pools.clone(),
            self.peers.finalization.clone(),
            ProposerConfig {
                my_url: network.my_hostname.clone(),
                request_timeout: network.proof_request_timeout,
            },
        ));
        let collector = Arc::new(RotationCollector::new(
            self.state.clone(),
            self.validator_id.clone(),
            self.pools.rotation.clone(),
            self.peers.rotation.clone(),
            CollectorConfig {
                my_url: network.my_hostname.clone(),
                request_timeout: network.proof_request_timeout,
            },
        ));
        let liveness = Arc::new(LivenessMonitor::new(
            self.state.clone(),
            timing.liveness_timeout,
        ));
        let rotation = Arc::new(EpochRotation::new(self.state.clone(), self.fetcher.clone()));

        BackgroundTasks {
            workers: vec![
                tokio::spawn(proposer.run(timing.block_generation_interval)),
                tokio::spawn(collector.run(timing.collector_interval)),
                tokio::spawn(liveness.run(timing.liveness_check_interval)),
            ],
            rotation: tokio::spawn(rotation.run(timing.rotation_tick)),
        }
    }
}

/// Handles of the spawned tasks.
pub struct BackgroundTasks {
    workers: Vec<JoinHandle<()>>,
    rotation: JoinHandle<EpochRotationError>,
}

impl BackgroundTasks {
    /// Resolves when the rotation loop stops, which only happens on a fatal
    /// error or a panic inside it.
    pub async fn rotation_failure(&mut self) -> anyhow::Error {
        match (&mut self.rotation).await {
            Ok(fatal) => anyhow::Error::new(fatal).context("Epoch rotation halted"),
            Err(join_error) => anyhow::Error::new(join_error).context("Epoch rotation task died"),
        }
    }

    pub fn abort_all(&self) {
        for worker in &self.workers {
            worker.abort();
        }
        self.rotation.abort();
    }
}
