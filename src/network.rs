//! Peer-facing HTTP client for gossip and chain retrieval.
//!
//! Every call is fire-and-forget: a peer that times out, refuses the
//! connection, or answers with an error is logged and skipped for the round.

use crate::block::Block;
use crate::blockchain::ChainEnvelope;
use crate::error::ChainError;
use crate::transaction::TransactionRequest;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::warn;

const PEER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new() -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(PEER_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChainError::NetworkError(e.to_string()))?;
        Ok(PeerClient { http })
    }

    /// `PUT /transactions`: forward a signed transaction to a peer.
    pub async fn share_transaction(&self, neighbor: &str, request: &TransactionRequest) {
        let endpoint = format!("http://{}/transactions", neighbor);
        if let Err(e) = self.http.put(&endpoint).json(request).send().await {
            warn!(peer = %neighbor, error = %e, "transaction gossip failed");
        }
    }

    /// `DELETE /transactions`: tell a peer to drop its pending pool after a
    /// successful mint.
    pub async fn clear_transaction_pool(&self, neighbor: &str) {
        let endpoint = format!("http://{}/transactions", neighbor);
        if let Err(e) = self.http.delete(&endpoint).send().await {
            warn!(peer = %neighbor, error = %e, "pool clear broadcast failed");
        }
    }

    /// `PUT /consensus`: ask a peer to run its own conflict resolution.
    pub async fn request_consensus(&self, neighbor: &str) {
        let endpoint = format!("http://{}/consensus", neighbor);
        if let Err(e) = self.http.put(&endpoint).send().await {
            warn!(peer = %neighbor, error = %e, "consensus broadcast failed");
        }
    }

    /// `GET /chain`: fetch a peer's full chain for a consensus round.
    /// Anything but a 200 with a decodable body yields `None`.
    pub async fn fetch_chain(&self, neighbor: &str) -> Option<Vec<Block>> {
        let endpoint = format!("http://{}/chain", neighbor);
        match self.http.get(&endpoint).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                match response.json::<ChainEnvelope>().await {
                    Ok(envelope) => Some(envelope.chain),
                    Err(e) => {
                        warn!(peer = %neighbor, error = %e, "undecodable chain response");
                        None
                    }
                }
            }
            Ok(response) => {
                warn!(peer = %neighbor, status = %response.status(), "chain fetch refused");
                None
            }
            Err(e) => {
                warn!(peer = %neighbor, error = %e, "chain fetch failed");
                None
            }
        }
    }
}
