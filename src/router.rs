//! HTTP router setup.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router. CORS is open: the consumer is a browser
/// frontend served from another origin.
pub fn create(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/state", get(handlers::dapp_state))
        .route("/connect", post(handlers::connect))
        .route("/presale/start", post(handlers::start_presale))
        .route("/presale/mint", post(handlers::presale_mint))
        .route("/mint", post(handlers::public_mint))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
