//! JSON/HTTP surface exposed to peers and the wallet collaborator.
//!
//! The router is built separately from the server so integration tests can
//! drive it in-process.

use crate::blockchain::ChainEnvelope;
use crate::error::ChainError;
use crate::node::Node;
use crate::transaction::{Transaction, TransactionRequest};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

fn success() -> Json<MessageResponse> {
    Json(MessageResponse { message: "success" })
}

fn fail() -> (StatusCode, Json<MessageResponse>) {
    (StatusCode::BAD_REQUEST, Json(MessageResponse { message: "fail" }))
}

#[derive(Serialize)]
struct PoolResponse {
    transactions: Vec<Transaction>,
    length: usize,
}

#[derive(Deserialize)]
struct AmountQuery {
    blockchain_address: String,
}

#[derive(Serialize)]
struct AmountResponse {
    amount: f32,
}

/// Builds the router with every endpoint wired to the node.
pub fn build_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chain", get(get_chain))
        .route(
            "/transactions",
            get(get_transactions)
                .post(create_transaction)
                .put(add_transaction)
                .delete(clear_transactions),
        )
        .route("/amount", get(get_amount))
        .route("/mine", get(mine))
        .route("/mine/start", get(start_mining))
        .route("/consensus", put(run_consensus))
        .route("/health", get(health))
        .with_state(node)
        .layer(cors)
}

/// Binds the listener and serves the router until the process exits.
pub async fn run_api_server(node: Arc<Node>, port: u16) -> Result<(), ChainError> {
    let app = build_router(node);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ChainError::NetworkError(e.to_string()))?;
    info!(%addr, "node API listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| ChainError::NetworkError(e.to_string()))
}

async fn get_chain(State(node): State<Arc<Node>>) -> Json<ChainEnvelope> {
    let blockchain = node.blockchain().lock().await;
    Json(ChainEnvelope {
        chain: blockchain.chain().to_vec(),
    })
}

async fn get_transactions(State(node): State<Arc<Node>>) -> Json<PoolResponse> {
    let blockchain = node.blockchain().lock().await;
    let transactions = blockchain.transaction_pool().to_vec();
    let length = transactions.len();
    Json(PoolResponse {
        transactions,
        length,
    })
}

/// Wallet-originated create: validates, pools, and gossips to peers.
async fn create_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return fail().into_response();
    };
    match node.create_transaction(request).await {
        Ok(()) => (StatusCode::CREATED, success()).into_response(),
        Err(e) => {
            warn!(error = %e, "transaction rejected");
            fail().into_response()
        }
    }
}

/// Peer-originated add: validates and pools, no further gossip.
async fn add_transaction(
    State(node): State<Arc<Node>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return fail().into_response();
    };
    match node.add_transaction(&request).await {
        Ok(()) => success().into_response(),
        Err(e) => {
            warn!(error = %e, "transaction rejected");
            fail().into_response()
        }
    }
}

/// Invoked by peers after a successful mint.
async fn clear_transactions(State(node): State<Arc<Node>>) -> Json<MessageResponse> {
    node.clear_transaction_pool().await;
    success()
}

async fn get_amount(
    State(node): State<Arc<Node>>,
    query: Result<Query<AmountQuery>, QueryRejection>,
) -> Response {
    let Ok(Query(query)) = query else {
        return fail().into_response();
    };
    let blockchain = node.blockchain().lock().await;
    let amount = blockchain.calculate_total_amount(&query.blockchain_address);
    Json(AmountResponse { amount }).into_response()
}

/// Manual one-shot mint.
async fn mine(State(node): State<Arc<Node>>) -> Json<MessageResponse> {
    node.mine().await;
    success()
}

/// Begins the periodic mining loop. Starting twice is reported but harmless.
async fn start_mining(State(node): State<Arc<Node>>) -> Json<MessageResponse> {
    if let Err(e) = node.start_mining() {
        info!(error = %e, "mining start request ignored");
    }
    success()
}

async fn run_consensus(State(node): State<Arc<Node>>) -> Json<MessageResponse> {
    node.resolve_conflicts().await;
    success()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
