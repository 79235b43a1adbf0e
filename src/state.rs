//! Application state shared across handlers.

use crate::config::Config;
use crate::contract::NftContract;
use crate::rpc::RpcClient;
use crate::sync::{self, SyncHandle};
use crate::wallet::Wallet;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sync: SyncHandle,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Wire up the chain stack and start the synchronizer. The cancellation
    /// token owns the poll tasks; cancelling it releases them on shutdown.
    pub fn new(config: Config, cancel: CancellationToken) -> Result<Self, crate::Error> {
        let rpc = Arc::new(RpcClient::new(&config.rpc_url));
        let wallet = Arc::new(Wallet::new(rpc, config.chain_id));
        let contract = Arc::new(NftContract::new(Arc::clone(&wallet), &config)?);

        info!(
            contract = %config.contract_address,
            chain_id = config.chain_id,
            poll_secs = config.poll_interval_secs,
            "Synchronizer starting"
        );

        let sync = sync::spawn(
            contract,
            wallet,
            Duration::from_secs(config.poll_interval_secs),
            cancel,
        );

        Ok(Self {
            config,
            sync,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }
}
