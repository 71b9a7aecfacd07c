//! # Generation Metadata
//!
//! Chain position of the local proposer, persisted under `GT`.

use serde::{Deserialize, Serialize};
use shared_crypto::blake3_hex;
use shared_types::ZERO_HASH;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub epoch_full_id: String,
    pub prev_hash: String,
    pub next_index: u64,
}

impl GenerationMetadata {
    /// Position before the first epoch: `blake3(ZERO_HASH + networkId)#-1`.
    pub fn genesis(network_id: &str) -> Self {
        Self {
            epoch_full_id: format!("{}#-1", blake3_hex(&format!("{ZERO_HASH}{network_id}"))),
            prev_hash: ZERO_HASH.to_string(),
            next_index: 0,
        }
    }

    /// Position after a block with `block_hash` was produced.
    pub fn advance(&self, block_hash: &str) -> Self {
        Self {
            epoch_full_id: self.epoch_full_id.clone(),
            prev_hash: block_hash.to_string(),
            next_index: self.next_index + 1,
        }
    }

    /// Position for the current epoch; a new epoch starts a new segment.
    pub fn for_epoch(&self, epoch_full_id: &str) -> Self {
        if self.epoch_full_id == epoch_full_id {
            self.clone()
        } else {
            Self {
                epoch_full_id: epoch_full_id.to_string(),
                prev_hash: ZERO_HASH.to_string(),
                next_index: 0,
            }
        }
    }
}
