pub mod metrics;
pub mod views;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics::Metrics;
use mutual_crypto::signatures::{parse_address, parse_hex32, verify_transaction};
use mutual_storage::Store;
use mutual_types::block::{Block, Receipt};
use mutual_types::state::LedgerState;
use mutual_types::transaction::Transaction;
use mutual_types::{ClaimId, PolicyId};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};
use views::{AccountView, ClaimView, ContributionView, PolicyView, PoolView, SubmittedView};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<LedgerState>>,
    pub storage: Arc<dyn Store>,
    pub tx_sender: mpsc::Sender<Transaction>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/tx", post(submit_tx))
        .route("/pool", get(get_pool))
        .route("/policy/:id", get(get_policy))
        .route("/policy/:id/claims", get(get_policy_claims))
        .route("/policies/:holder", get(get_policies_of))
        .route("/claim/:id", get(get_claim))
        .route("/contribution/:address", get(get_contribution))
        .route("/account/:address", get(get_account))
        .route("/block/:height", get(get_block))
        .route("/receipt/:tx_id", get(get_receipt))
        .route("/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on {}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Mutual insurance ledger API v0.1"
}

async fn submit_tx(
    State(state): State<AppState>,
    Json(tx): Json<Transaction>,
) -> Result<Json<SubmittedView>, ApiError> {
    verify_transaction(&tx).map_err(|e| ApiError::bad_request(format!("{:#}", e)))?;
    let tx_id = tx.id();
    let instruction = tx.instruction.name();

    state
        .tx_sender
        .send(tx)
        .await
        .map_err(|_| ApiError::unavailable("sequencer is not accepting transactions"))?;
    state.metrics.record_submission(instruction);
    debug!(tx = %hex::encode(tx_id), instruction, "Transaction queued");

    Ok(Json(SubmittedView {
        tx_id: hex::encode(tx_id),
    }))
}

async fn get_pool(State(state): State<AppState>) -> Json<PoolView> {
    let ledger = state.ledger.read().await;
    Json(PoolView {
        pool_balance: ledger.pool_balance(),
        ledger_balance: ledger.pool.balance(),
        policies: ledger.policies.len() as u64,
        claims: ledger.claims.len() as u64,
    })
}

async fn get_policy(State(state): State<AppState>, Path(id): Path<PolicyId>) -> Json<PolicyView> {
    let ledger = state.ledger.read().await;
    Json(PolicyView::from(&ledger.get_policy(id)))
}

async fn get_policy_claims(
    State(state): State<AppState>,
    Path(id): Path<PolicyId>,
) -> Json<Vec<ClaimId>> {
    let ledger = state.ledger.read().await;
    Json(ledger.claims_of(id).to_vec())
}

async fn get_policies_of(
    State(state): State<AppState>,
    Path(holder): Path<String>,
) -> Result<Json<Vec<PolicyId>>, ApiError> {
    let holder = parse_address(&holder).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let ledger = state.ledger.read().await;
    Ok(Json(ledger.policies_of(&holder).to_vec()))
}

async fn get_claim(State(state): State<AppState>, Path(id): Path<ClaimId>) -> Json<ClaimView> {
    let ledger = state.ledger.read().await;
    Json(ClaimView::from(&ledger.get_claim(id)))
}

async fn get_contribution(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ContributionView>, ApiError> {
    let contributor = parse_address(&address).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let ledger = state.ledger.read().await;
    Ok(Json(ContributionView {
        contributor: hex::encode(contributor),
        total: ledger.contribution_of(&contributor),
    }))
}

async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AccountView>, ApiError> {
    let who = parse_address(&address).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let ledger = state.ledger.read().await;
    let account = ledger.account(&who);
    Ok(Json(AccountView {
        address: hex::encode(who),
        nonce: account.nonce,
        balance: account.balance,
    }))
}

async fn get_block(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    state
        .storage
        .load_block_by_height(height)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("block {} not found", height)))
}

async fn get_receipt(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    let id = parse_hex32(&tx_id).map_err(|e| ApiError::bad_request(e.to_string()))?;
    state
        .storage
        .load_receipt(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("receipt {} not found", tx_id)))
}

async fn get_metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    let ledger = state.ledger.read().await;
    state.metrics.observe(&ledger);
    drop(ledger);
    state.metrics.render().map_err(ApiError::from)
}

#[cfg(test)]
mod tests;
