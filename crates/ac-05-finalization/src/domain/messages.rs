//! Request and response shapes of the finalization surface.

use ac_01_block_model::Block;
use serde::{Deserialize, Serialize};
use shared_types::{AggregatedFinalizationProof, ValidatorId};

/// Ask a quorum member to vote for `block`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizationRequest {
    pub block: Block,
    /// Proof for block `index - 1`; absent for the first block of a segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_block_afp: Option<AggregatedFinalizationProof>,
}

/// A quorum member's signature over the finalization message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizationVote {
    pub voter: ValidatorId,
    pub finalization_proof: String,
    pub voted_for_hash: String,
}

/// A stored block and, when present, the AFP of the next block, which is
/// what proves the requested block final.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockWithAfp {
    pub block: Block,
    pub afp: Option<AggregatedFinalizationProof>,
}
