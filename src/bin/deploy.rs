//! One-shot deployer binary.
//!
//! Prints the deployed contract address to stdout and exits 0; any failure
//! is reported on stderr with exit code 1.

use presale_gateway::rpc::RpcClient;
use presale_gateway::{deploy, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("gateway").required(false))
        .add_source(config::Environment::with_prefix("GATEWAY"))
        .build()?
        .try_deserialize()
        .unwrap_or_default();

    info!(
        rpc = %config.rpc_url,
        artifact = %config.artifact_path,
        "Deploying NFT contract"
    );

    let rpc = RpcClient::new(&config.rpc_url);
    let address = deploy::deploy(&config, &rpc).await?;

    println!("{address}");
    Ok(())
}
