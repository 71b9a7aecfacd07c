use serde::{Deserialize, Serialize};
use shared_types::LeaderFinalizationProof;

/// Body of `POST /accept_leader_finalization`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptLeaderFinalizationRequest {
    pub leader_finalizations: Vec<LeaderFinalizationProof>,
}
