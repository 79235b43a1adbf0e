//! Presale Gateway binary.

use presale_gateway::{create_router, AppState, Config};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Presale Gateway");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("gateway").required(false))
        .add_source(config::Environment::with_prefix("GATEWAY"))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            // Fall back only when no config exists; parsing errors fail hard.
            // Every field has a default, so only a missing file lands here.
            let err_str = format!("{e}");
            if err_str.contains("not found") {
                warn!(error = %e, "No config file found, using defaults");
                Config::default()
            } else {
                error!(error = %e, "FATAL: Config error — fix env vars or gateway.toml");
                std::process::exit(1);
            }
        });

    info!(
        contract = %config.contract_address,
        rpc = %config.rpc_url,
        chain_id = config.chain_id,
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();

    // The token owns the synchronizer's poll tasks for the session lifetime.
    let cancel = CancellationToken::new();
    let state = Arc::new(AppState::new(config, cancel.clone())?);

    let app = create_router(Arc::clone(&state));

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the poll tasks; without this the minted-count poll would
    // outlive the server.
    cancel.cancel();
    info!("Gateway shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
