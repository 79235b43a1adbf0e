//! HTTP request handlers.
//!
//! The handlers are the UI layer of the dapp: they present the snapshot and
//! gate user actions. A gate refusal is answered here and never reaches the
//! contract writer.

use crate::phase::Action;
use crate::response::{ActionResponse, HealthResponse, StateResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

/// Health check with basic metrics.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        contract_address: state.config.contract_address.clone(),
        chain_id: state.config.chain_id,
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
    })
}

/// Current session snapshot and the single available action.
pub async fn dapp_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let snapshot = state.sync.snapshot();
    Json(StateResponse::from_snapshot(&snapshot, state.config.max_supply))
}

/// Wallet handshake (or retry after a wrong-network alert).
pub async fn connect(State(state): State<Arc<AppState>>) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    match state.sync.connect().await {
        Ok(()) => (StatusCode::OK, Json(ActionResponse::ok(None))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn start_presale(State(state): State<Arc<AppState>>) -> Response {
    submit(state, Action::StartPresale).await
}

pub async fn presale_mint(State(state): State<Arc<AppState>>) -> Response {
    submit(state, Action::PresaleMint).await
}

pub async fn public_mint(State(state): State<Arc<AppState>>) -> Response {
    submit(state, Action::PublicMint).await
}

async fn submit(state: Arc<AppState>, action: Action) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    info!(action = ?action, "Action requested");
    match state.sync.submit(action).await {
        Ok(tx_hash) => (StatusCode::OK, Json(ActionResponse::ok(Some(tx_hash)))).into_response(),
        Err(e) => e.into_response(),
    }
}
