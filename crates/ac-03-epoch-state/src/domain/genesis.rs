//! # Genesis
//!
//! Network-wide constants every node starts from.

use ac_02_quorum_selection::derive_assignment;
use serde::{Deserialize, Serialize};
use shared_crypto::blake3_hex;
use shared_types::{
    ApprovementThreadMetadataHandler, EpochDataHandler, NetworkParameters, ValidatorId,
    ValidatorStorage, ZERO_HASH,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genesis {
    pub network_id: String,
    /// Start of epoch 0 in milliseconds.
    pub first_epoch_start_timestamp: u64,
    pub network_parameters: NetworkParameters,
    pub validators: Vec<ValidatorStorage>,
    #[serde(default)]
    pub core_major_version: i32,
}

impl Genesis {
    /// Hash of epoch 0: `blake3(ZERO_HASH + networkId)`.
    pub fn first_epoch_hash(&self) -> String {
        blake3_hex(&format!("{ZERO_HASH}{}", self.network_id))
    }

    pub fn registry(&self) -> Vec<ValidatorId> {
        self.validators.iter().map(|v| v.pubkey.clone()).collect()
    }

    /// Root state at the start of epoch 0.
    pub fn root_handler(&self) -> ApprovementThreadMetadataHandler {
        let hash = self.first_epoch_hash();
        let registry = self.registry();
        let assignment =
            derive_assignment(&registry, &hash, self.network_parameters.quorum_size);

        ApprovementThreadMetadataHandler {
            core_major_version: self.core_major_version,
            network_parameters: self.network_parameters.clone(),
            epoch: EpochDataHandler {
                id: 0,
                hash,
                validators_registry: registry,
                quorum: assignment.quorum,
                leaders_sequence: assignment.leaders_sequence,
                current_leader_index: 0,
                start_timestamp: self.first_epoch_start_timestamp,
            },
        }
    }
}
