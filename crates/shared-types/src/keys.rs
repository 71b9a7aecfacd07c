//! # Storage Keys
//!
//! Every ASCII key the node persists, grouped by namespace.
//!
//! | Namespace | Key | Value |
//! |---|---|---|
//! | Blocks | `epoch:creator:index` | block |
//! | Blocks | `GT` | generation metadata |
//! | FinalizationVotingStats | `epoch:creator` | `VotingStat` |
//! | FinalizationVotingStats | `EPOCH_FINISH:<epoch>` | `"TRUE"` |
//! | FinalizationVotingStats | `BLOCK_CREATOR_HEALTH:<epoch>:<creator>` | `BlockCreatorHealthStatus` |
//! | FinalizationVotingStats | `ANCHOR_ROTATION_PROOF:<epoch>:<creator>` | `AnchorRotationProof` |
//! | FinalizationVotingStats | `LEADER_FINALIZATION_PROOF:<epoch>:<leader>` | `LeaderFinalizationProof` |
//! | EpochData | `AFP:<blockId>` | `AggregatedFinalizationProof` |
//! | EpochData | `EPOCH_HANDLER:<epoch>` | `EpochDataHandler` |
//! | EpochData | `FIRST_BLOCK_ASSUMPTION:<epoch>` | `FirstBlockAssumption` |
//! | ApprovementThread | `AT` | `ApprovementThreadMetadataHandler` |
//! | ApprovementThread | `<pubkey>_VALIDATOR_STORAGE` | `ValidatorStorage` |
//! | ApprovementThread | `EPOCH_DATA:<epoch>` | `NextEpochDataHandler` |
//! | State | `LATEST_BATCH_INDEX` | last applied delayed batch epoch |

use crate::ids::ValidatorId;

/// Generation metadata of the local proposer.
pub const GENERATION_METADATA: &str = "GT";

/// Root approvement-thread record.
pub const APPROVEMENT_THREAD: &str = "AT";

/// Epoch index of the last applied delayed-transactions batch.
pub const LATEST_BATCH_INDEX: &str = "LATEST_BATCH_INDEX";

/// Value of a finish marker.
pub const EPOCH_FINISH_VALUE: &[u8] = b"TRUE";

pub fn voting_stat(epoch: u64, creator: &ValidatorId) -> String {
    format!("{epoch}:{creator}")
}

pub fn epoch_finish(epoch: u64) -> String {
    format!("EPOCH_FINISH:{epoch}")
}

pub fn block_creator_health(epoch: u64, creator: &ValidatorId) -> String {
    format!("BLOCK_CREATOR_HEALTH:{epoch}:{creator}")
}

pub fn anchor_rotation_proof(epoch: u64, creator: &ValidatorId) -> String {
    format!("ANCHOR_ROTATION_PROOF:{epoch}:{creator}")
}

pub fn leader_finalization_proof(epoch: u64, leader: &ValidatorId) -> String {
    format!("LEADER_FINALIZATION_PROOF:{epoch}:{leader}")
}

pub fn afp(block_id: &str) -> String {
    format!("AFP:{block_id}")
}

pub fn epoch_handler(epoch: u64) -> String {
    format!("EPOCH_HANDLER:{epoch}")
}

pub fn first_block_assumption(epoch: u64) -> String {
    format!("FIRST_BLOCK_ASSUMPTION:{epoch}")
}

pub fn validator_storage(pubkey: &ValidatorId) -> String {
    format!("{pubkey}_VALIDATOR_STORAGE")
}

pub fn next_epoch_data(epoch: u64) -> String {
    format!("EPOCH_DATA:{epoch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        let v = ValidatorId::from("ab");
        assert_eq!(voting_stat(5, &v), "5:ab");
        assert_eq!(epoch_finish(5), "EPOCH_FINISH:5");
        assert_eq!(anchor_rotation_proof(5, &v), "ANCHOR_ROTATION_PROOF:5:ab");
        assert_eq!(afp("5:ab:3"), "AFP:5:ab:3");
        assert_eq!(validator_storage(&v), "ab_VALIDATOR_STORAGE");
    }
}
