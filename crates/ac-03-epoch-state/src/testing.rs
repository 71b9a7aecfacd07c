//! Testing utilities.
//!
//! Validators are derived from fixed Ed25519 seeds (`[1; 32]`, `[2; 32]`,
//! ...), so every test run sees the same keys, quorum and leader order.
//! Enable with the `test-utils` feature flag.

use crate::domain::genesis::Genesis;
use crate::service::EpochState;
use ac_02_quorum_selection::finalization_message;
use shared_crypto::NodeIdentity;
use shared_types::{
    AggregatedFinalizationProof, EpochDataHandler, InMemoryKVStore, NetworkParameters,
    SignatureMap, ValidatorId, ValidatorStorage,
};
use std::sync::Arc;

pub const TEST_NETWORK_ID: &str = "anchors-testnet";

/// A genesis plus the key pairs of every validator in it.
pub struct TestNetwork {
    pub identities: Vec<NodeIdentity>,
    pub genesis: Genesis,
}

impl TestNetwork {
    pub fn new(validators: u8, quorum_size: usize) -> Self {
        let identities: Vec<NodeIdentity> = (1..=validators)
            .map(|i| NodeIdentity::from_seed([i; 32]))
            .collect();
        let genesis = Genesis {
            network_id: TEST_NETWORK_ID.to_string(),
            first_epoch_start_timestamp: 1_000,
            network_parameters: NetworkParameters {
                quorum_size,
                epoch_duration: 60_000,
            },
            validators: identities
                .iter()
                .enumerate()
                .map(|(i, id)| ValidatorStorage {
                    pubkey: ValidatorId::from(id.public_key()),
                    url: format!("http://node-{i}"),
                })
                .collect(),
            core_major_version: 1,
        };
        Self {
            identities,
            genesis,
        }
    }

    pub fn with_epoch_duration(mut self, epoch_duration: u64) -> Self {
        self.genesis.network_parameters.epoch_duration = epoch_duration;
        self
    }

    pub fn state(&self) -> (Arc<EpochState>, Arc<InMemoryKVStore>) {
        let store = Arc::new(InMemoryKVStore::new());
        (self.state_with_store(store.clone()), store)
    }

    pub fn state_with_store(&self, store: Arc<InMemoryKVStore>) -> Arc<EpochState> {
        Arc::new(EpochState::bootstrap(store, &self.genesis).expect("genesis bootstrap"))
    }

    pub fn identity(&self, id: &ValidatorId) -> &NodeIdentity {
        self.identities
            .iter()
            .find(|i| i.public_key() == id.as_str())
            .expect("validator is part of the test network")
    }

    /// Owned copy of a validator's key pair, for services that keep one.
    pub fn owned_identity(&self, id: &ValidatorId) -> NodeIdentity {
        let position = self
            .identities
            .iter()
            .position(|i| i.public_key() == id.as_str())
            .expect("validator is part of the test network");
        NodeIdentity::from_seed([position as u8 + 1; 32])
    }

    pub fn url_of(&self, id: &ValidatorId) -> String {
        self.genesis
            .validators
            .iter()
            .find(|v| &v.pubkey == id)
            .map(|v| v.url.clone())
            .expect("validator is part of the test network")
    }

    /// Quorum members of `epoch` as key pairs, in quorum order.
    pub fn quorum_identities(&self, epoch: &EpochDataHandler) -> Vec<&NodeIdentity> {
        epoch.quorum.iter().map(|v| self.identity(v)).collect()
    }

    /// Validators outside the quorum of `epoch`.
    pub fn outsiders(&self, epoch: &EpochDataHandler) -> Vec<&NodeIdentity> {
        self.identities
            .iter()
            .filter(|i| !epoch.quorum.iter().any(|q| q.as_str() == i.public_key()))
            .collect()
    }

    /// AFP signed by `signers` over the canonical finalization message.
    pub fn sign_afp(
        &self,
        signers: &[&NodeIdentity],
        prev_block_hash: &str,
        block_id: &str,
        block_hash: &str,
        epoch_full_id: &str,
    ) -> AggregatedFinalizationProof {
        let message = finalization_message(prev_block_hash, block_id, block_hash, epoch_full_id);
        let proofs: SignatureMap = signers
            .iter()
            .map(|s| (ValidatorId::from(s.public_key()), s.sign(&message)))
            .collect();
        AggregatedFinalizationProof {
            prev_block_hash: prev_block_hash.to_string(),
            block_id: block_id.to_string(),
            block_hash: block_hash.to_string(),
            proofs,
        }
    }
}
