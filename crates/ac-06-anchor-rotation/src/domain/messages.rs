//! # Rotation Messages
//!
//! Wire shapes of the rotation-signature exchange and the canonical message
//! quorum members sign.

use serde::{Deserialize, Serialize};
use shared_types::{AnchorRotationProof, ValidatorId, VotingStat};

/// `ANCHOR_ROTATION_PROOF:<epoch>:<creator>:<index>:<hash>:<epochFullId>`
pub fn rotation_message(
    epoch: u64,
    creator: &ValidatorId,
    stat: &VotingStat,
    epoch_full_id: &str,
) -> String {
    format!(
        "ANCHOR_ROTATION_PROOF:{epoch}:{creator}:{}:{}:{epoch_full_id}",
        stat.index, stat.hash
    )
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRotationProofRequest {
    pub epoch_index: u64,
    pub creator: ValidatorId,
    pub proposal: VotingStat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationStatus {
    /// Responder holds no stat for the creator.
    Upgrade,
    Ok,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRotationProofResponse {
    pub status: RotationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_stat: Option<VotingStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl AnchorRotationProofResponse {
    pub fn upgrade() -> Self {
        Self {
            status: RotationStatus::Upgrade,
            voting_stat: None,
            signature: None,
        }
    }

    /// The responder is ahead; carries its stat and no signature.
    pub fn fresher(stat: VotingStat) -> Self {
        Self {
            status: RotationStatus::Ok,
            voting_stat: Some(stat),
            signature: None,
        }
    }

    pub fn signed(stat: VotingStat, signature: String) -> Self {
        Self {
            status: RotationStatus::Ok,
            voting_stat: Some(stat),
            signature: Some(signature),
        }
    }
}

/// Body of `POST /accept_extra_data`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRotationProofsRequest {
    pub rotation_proofs: Vec<AnchorRotationProof>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedProofs {
    pub accepted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let encoded = serde_json::to_string(&AnchorRotationProofResponse::upgrade()).unwrap();
        assert_eq!(encoded, r#"{"status":"UPGRADE"}"#);

        let decoded: AnchorRotationProofResponse =
            serde_json::from_str(r#"{"status":"OK","signature":"ab"}"#).unwrap();
        assert_eq!(decoded.status, RotationStatus::Ok);
        assert_eq!(decoded.signature.as_deref(), Some("ab"));
        assert!(decoded.voting_stat.is_none());
    }

    #[test]
    fn test_rotation_message_shape() {
        let stat = VotingStat {
            index: 7,
            hash: "h".into(),
            ..VotingStat::template()
        };
        let message = rotation_message(5, &ValidatorId::from("x"), &stat, "e#5");
        assert_eq!(message, "ANCHOR_ROTATION_PROOF:5:x:7:h:e#5");
    }
}
