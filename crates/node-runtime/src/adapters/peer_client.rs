//! # HTTP Peer Client
//!
//! One `reqwest` client implementing every outbound port.
//!
//! | Port | Request |
//! |---|---|
//! | `BlockSource` | `GET <url>/block/<id>` |
//! | `FinalizationPeer` | `POST <url>/finalization_proof` |
//! | `RotationPeer` (signature) | `POST <url>/anchor_rotation_proof` |
//! | `RotationPeer` (broadcast) | `POST <url>/accept_extra_data` |
//!
//! Peers answer either the expected JSON body or `{"err": "<reason>"}`.

use ac_01_block_model::{Block, BlockSource};
use ac_05_finalization::{FinalizationPeer, FinalizationRequest, FinalizationVote};
use ac_06_anchor_rotation::{
    AcceptRotationProofsRequest, AcceptedProofs, AnchorRotationProofRequest,
    AnchorRotationProofResponse, RotationPeer,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::PeerError;
use std::time::Duration;

/// Body of a peer answer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PeerReply<T> {
    Err { err: String },
    Ok(T),
}

pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    /// `timeout` is an upper bound; callers apply their own per-call deadline.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build peer HTTP client")?;
        Ok(Self { client })
    }

    /// Send `request`; `Ok(None)` on 404.
    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Option<T>, PeerError> {
        let response = request.send().await.map_err(|e| transport(url, e))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PeerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| transport(url, e))?;
        decode_reply(url, &body).map(Some)
    }

    async fn post<B, T>(&self, peer_url: &str, path: &str, body: &B) -> Result<Option<T>, PeerError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = endpoint(peer_url, path);
        self.send(peer_url, self.client.post(url).json(body)).await
    }
}

fn endpoint(peer_url: &str, path: &str) -> String {
    format!("{}/{}", peer_url.trim_end_matches('/'), path)
}

fn transport(url: &str, e: reqwest::Error) -> PeerError {
    if e.is_timeout() {
        PeerError::Timeout {
            url: url.to_string(),
        }
    } else {
        PeerError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

fn decode_reply<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, PeerError> {
    match serde_json::from_str::<PeerReply<T>>(body) {
        Ok(PeerReply::Ok(value)) => Ok(value),
        Ok(PeerReply::Err { err }) => Err(PeerError::Rejected {
            url: url.to_string(),
            message: err,
        }),
        Err(e) => Err(PeerError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }),
    }
}

/// A rejection is a plain "no" for lookups and votes.
fn rejected_as_none<T>(result: Result<Option<T>, PeerError>) -> Result<Option<T>, PeerError> {
    match result {
        Err(PeerError::Rejected { .. }) => Ok(None),
        other => other,
    }
}

fn required<T>(url: &str, value: Option<T>) -> Result<T, PeerError> {
    value.ok_or_else(|| PeerError::Status {
        url: url.to_string(),
        status: StatusCode::NOT_FOUND.as_u16(),
    })
}

#[async_trait]
impl BlockSource for HttpPeerClient {
    async fn fetch_block(&self, peer_url: &str, block_id: &str) -> Result<Option<Block>, PeerError> {
        let url = endpoint(peer_url, &format!("block/{block_id}"));
        rejected_as_none(self.send(peer_url, self.client.get(url)).await)
    }
}

#[async_trait]
impl FinalizationPeer for HttpPeerClient {
    async fn request_finalization(
        &self,
        peer_url: &str,
        request: &FinalizationRequest,
    ) -> Result<Option<FinalizationVote>, PeerError> {
        rejected_as_none(self.post(peer_url, "finalization_proof", request).await)
    }
}

#[async_trait]
impl RotationPeer for HttpPeerClient {
    async fn request_rotation_signature(
        &self,
        peer_url: &str,
        request: &AnchorRotationProofRequest,
    ) -> Result<AnchorRotationProofResponse, PeerError> {
        let response = self.post(peer_url, "anchor_rotation_proof", request).await?;
        required(peer_url, response)
    }

    async fn broadcast_rotation_proofs(
        &self,
        peer_url: &str,
        request: &AcceptRotationProofsRequest,
    ) -> Result<usize, PeerError> {
        let response: Option<AcceptedProofs> =
            self.post(peer_url, "accept_extra_data", request).await?;
        required(peer_url, response).map(|r| r.accepted)
    }
}
