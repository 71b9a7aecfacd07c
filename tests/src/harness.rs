//! # In-Process Cluster
//!
//! Every validator of a [`TestNetwork`] gets its own store, epoch state and
//! inbound services. A [`Router`] stands in for the HTTP client: it resolves
//! a peer URL to the node behind it and calls the inbound service directly,
//! mapping service errors to the `{"err": ...}` rejection a remote peer
//! would send.

use ac_01_block_model::{
    Block, BlockFetcher, BlockFetcherConfig, BlockSource, ExtraData, GenerationMetadata,
};
use ac_02_quorum_selection::majority;
use ac_03_epoch_state::testing::TestNetwork;
use ac_03_epoch_state::EpochState;
use ac_04_proof_mempool::ProofPools;
use ac_05_finalization::{
    BlockProposer, FinalizationPeer, FinalizationRequest, FinalizationService, FinalizationVote,
    ProposerConfig,
};
use ac_06_anchor_rotation::{
    AcceptRotationProofsRequest, AnchorRotationProofRequest, AnchorRotationProofResponse,
    CollectorConfig, RotationCollector, RotationPeer, RotationService,
};
use ac_08_epoch_rotation::EpochRotation;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    keys, AggregatedFinalizationProof, BlockId, EpochDataHandler, InMemoryKVStore, JsonStoreExt,
    Namespace, PeerError, ValidatorId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Per-call deadline used by every outbound task in the cluster.
pub const PEER_TIMEOUT: Duration = Duration::from_millis(200);

/// One validator: its state plus the inbound services peers call.
pub struct Node {
    pub id: ValidatorId,
    pub url: String,
    pub state: Arc<EpochState>,
    pub store: Arc<InMemoryKVStore>,
    pub pools: ProofPools,
    pub finalization: Arc<FinalizationService>,
    pub rotation: Arc<RotationService>,
}

/// URL → node resolution with switchable outages.
#[derive(Default)]
pub struct Router {
    nodes: HashMap<String, Arc<Node>>,
    offline: Mutex<HashSet<String>>,
}

impl Router {
    fn reach(&self, url: &str) -> Result<&Arc<Node>, PeerError> {
        if self.offline.lock().contains(url) {
            return Err(PeerError::Timeout {
                url: url.to_string(),
            });
        }
        self.nodes.get(url).ok_or_else(|| PeerError::Transport {
            url: url.to_string(),
            message: "connection refused".into(),
        })
    }
}

fn rejected(url: &str, error: impl std::fmt::Display) -> PeerError {
    PeerError::Rejected {
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[async_trait]
impl BlockSource for Router {
    async fn fetch_block(&self, peer_url: &str, block_id: &str) -> Result<Option<Block>, PeerError> {
        let node = self.reach(peer_url)?;
        node.store
            .get_json(Namespace::Blocks, block_id)
            .map_err(|e| rejected(peer_url, e))
    }
}

#[async_trait]
impl FinalizationPeer for Router {
    async fn request_finalization(
        &self,
        peer_url: &str,
        request: &FinalizationRequest,
    ) -> Result<Option<FinalizationVote>, PeerError> {
        let node = self.reach(peer_url)?;
        Ok(node.finalization.handle_request(request).ok())
    }
}

#[async_trait]
impl RotationPeer for Router {
    async fn request_rotation_signature(
        &self,
        peer_url: &str,
        request: &AnchorRotationProofRequest,
    ) -> Result<AnchorRotationProofResponse, PeerError> {
        let node = self.reach(peer_url)?;
        node.rotation
            .respond(request)
            .await
            .map_err(|e| rejected(peer_url, e))
    }

    async fn broadcast_rotation_proofs(
        &self,
        peer_url: &str,
        request: &AcceptRotationProofsRequest,
    ) -> Result<usize, PeerError> {
        let node = self.reach(peer_url)?;
        node.rotation
            .accept_rotation_proofs(request.clone())
            .await
            .map_err(|e| rejected(peer_url, e))
    }
}

pub struct Cluster {
    pub network: TestNetwork,
    /// Nodes in genesis order.
    pub nodes: Vec<Arc<Node>>,
    pub router: Arc<Router>,
}

impl Cluster {
    /// Fresh cluster at the genesis epoch.
    pub fn new(validators: u8, quorum_size: usize) -> Self {
        Self::build(TestNetwork::new(validators, quorum_size), None)
    }

    /// Cluster whose stores already hold the genesis epoch renumbered to
    /// `epoch_id`, as if that many rotations kept the same hash.
    pub fn at_epoch(validators: u8, quorum_size: usize, epoch_id: u64) -> Self {
        Self::build(TestNetwork::new(validators, quorum_size), Some(epoch_id))
    }

    fn build(network: TestNetwork, epoch_id: Option<u64>) -> Self {
        let mut nodes = Vec::new();
        for validator in &network.genesis.validators {
            let store = Arc::new(InMemoryKVStore::new());
            if let Some(epoch_id) = epoch_id {
                seed_epoch(&network, &store, epoch_id);
            }
            let state = network.state_with_store(store.clone());
            let pools = ProofPools::new();
            let identity = Arc::new(network.owned_identity(&validator.pubkey));
            let finalization = Arc::new(FinalizationService::new(state.clone(), identity.clone()));
            let rotation = Arc::new(RotationService::new(
                state.clone(),
                identity,
                pools.rotation.clone(),
            ));
            nodes.push(Arc::new(Node {
                id: validator.pubkey.clone(),
                url: validator.url.clone(),
                state,
                store,
                pools,
                finalization,
                rotation,
            }));
        }

        let router = Router {
            nodes: nodes.iter().map(|n| (n.url.clone(), n.clone())).collect(),
            offline: Mutex::new(HashSet::new()),
        };
        Self {
            network,
            nodes,
            router: Arc::new(router),
        }
    }

    pub fn node(&self, id: &ValidatorId) -> &Arc<Node> {
        self.nodes
            .iter()
            .find(|n| &n.id == id)
            .expect("validator is part of the cluster")
    }

    /// Current epoch as seen by the first node.
    pub fn epoch(&self) -> EpochDataHandler {
        self.nodes[0].state.current_epoch()
    }

    pub fn leader(&self) -> ValidatorId {
        self.epoch()
            .current_leader()
            .cloned()
            .expect("non-empty leader sequence")
    }

    /// Quorum members of the current epoch other than `id`.
    pub fn quorum_except(&self, id: &ValidatorId) -> Vec<ValidatorId> {
        self.epoch()
            .quorum
            .into_iter()
            .filter(|v| v != id)
            .collect()
    }

    pub fn take_offline(&self, id: &ValidatorId) {
        self.router.offline.lock().insert(self.node(id).url.clone());
    }

    pub fn network_id(&self) -> String {
        self.network.genesis.network_id.clone()
    }

    /// `len` consecutive signed blocks of `creator` in the current epoch,
    /// built off-node.
    pub fn chain(&self, creator: &ValidatorId, len: u64) -> Vec<Block> {
        let network_id = self.network_id();
        let identity = self.network.identity(creator);
        let mut metadata =
            GenerationMetadata::genesis(&network_id).for_epoch(&self.epoch().full_id());
        let mut blocks = Vec::new();
        for i in 0..len {
            let mut block = Block::new(creator.clone(), 10 + i, ExtraData::Empty, &metadata);
            block.sign(identity, &network_id);
            metadata = metadata.advance(&block.hash(&network_id));
            blocks.push(block);
        }
        blocks
    }

    /// AFP over `block` signed by the quorum members at `signers`.
    pub fn certify_with(&self, block: &Block, signers: &[usize]) -> AggregatedFinalizationProof {
        let epoch = self.epoch();
        let quorum = self.network.quorum_identities(&epoch);
        let signers: Vec<_> = signers.iter().map(|i| quorum[*i]).collect();
        let block_id = BlockId::new(epoch.id, block.creator.clone(), block.index);
        self.network.sign_afp(
            &signers,
            &block.prev_hash,
            &block_id.to_string(),
            &block.hash(&self.network_id()),
            &epoch.full_id(),
        )
    }

    /// AFP over `block` signed by the first majority of the quorum.
    pub fn certify(&self, block: &Block) -> AggregatedFinalizationProof {
        let need: Vec<usize> = (0..majority(self.epoch().quorum.len())).collect();
        self.certify_with(block, &need)
    }

    pub fn proposer(&self, id: &ValidatorId) -> BlockProposer {
        let node = self.node(id);
        BlockProposer::new(
            node.state.clone(),
            node.finalization.clone(),
            node.pools.clone(),
            self.router.clone(),
            ProposerConfig {
                my_url: node.url.clone(),
                request_timeout: PEER_TIMEOUT,
            },
        )
    }

    pub fn collector(&self, id: &ValidatorId) -> RotationCollector {
        let node = self.node(id);
        RotationCollector::new(
            node.state.clone(),
            node.id.clone(),
            node.pools.rotation.clone(),
            self.router.clone(),
            CollectorConfig {
                my_url: node.url.clone(),
                request_timeout: PEER_TIMEOUT,
            },
        )
    }

    pub fn epoch_rotation(&self, id: &ValidatorId) -> EpochRotation {
        let node = self.node(id);
        let fetcher = BlockFetcher::new(
            BlockFetcherConfig {
                my_hostname: node.url.clone(),
                bootstrap_nodes: Vec::new(),
                request_timeout: PEER_TIMEOUT,
            },
            node.state.store().clone(),
            self.router.clone(),
        );
        EpochRotation::new(node.state.clone(), Arc::new(fetcher))
    }
}

/// Write the registry records and an `AT` for `epoch_id` before bootstrap.
fn seed_epoch(network: &TestNetwork, store: &InMemoryKVStore, epoch_id: u64) {
    let mut root = network.genesis.root_handler();
    root.epoch.id = epoch_id;
    for validator in &network.genesis.validators {
        store
            .put_json(
                Namespace::ApprovementThread,
                &keys::validator_storage(&validator.pubkey),
                validator,
            )
            .expect("in-memory write");
    }
    store
        .put_json(
            Namespace::EpochData,
            &keys::epoch_handler(epoch_id),
            &root.epoch,
        )
        .expect("in-memory write");
    store
        .put_json(Namespace::ApprovementThread, keys::APPROVEMENT_THREAD, &root)
        .expect("in-memory write");
}
