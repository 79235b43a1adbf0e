//! Gateway configuration.

use serde::Deserialize;

/// Configuration for the gateway and the one-shot deployer.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    /// The single supported chain. Any other chain id aborts the operation
    /// with a wrong-network error.
    #[serde(default = "defaults::chain_id")]
    pub chain_id: u64,

    /// Address of the deployed NFT contract. Required by the gateway.
    #[serde(default)]
    pub contract_address: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Fixed price for both presale and public mints, in wei.
    #[serde(default = "defaults::mint_price_wei")]
    pub mint_price_wei: u64,

    /// Collection cap, for the minted/max display.
    #[serde(default = "defaults::max_supply")]
    pub max_supply: u64,

    #[serde(default = "defaults::poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Cadence of the receipt poll while waiting for a confirmation.
    #[serde(default = "defaults::confirm_interval_ms")]
    pub confirm_interval_ms: u64,

    /// Upper bound on the confirmation wait before the write is reported
    /// as failed.
    #[serde(default = "defaults::confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,

    // --- Deployer inputs ---
    /// Base URL the contract serves token metadata from.
    #[serde(default = "defaults::metadata_url")]
    pub metadata_url: String,

    /// Address of the whitelist contract passed to the constructor.
    #[serde(default = "defaults::whitelist_contract")]
    pub whitelist_contract: String,

    /// Path to the compiled contract artifact (JSON with a `bytecode` field).
    #[serde(default = "defaults::artifact_path")]
    pub artifact_path: String,

    /// Account the deploy transaction is sent from. Empty means the first
    /// account the node exposes.
    #[serde(default)]
    pub deployer_account: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            chain_id: defaults::chain_id(),
            contract_address: String::new(),
            bind_address: defaults::bind_address(),
            mint_price_wei: defaults::mint_price_wei(),
            max_supply: defaults::max_supply(),
            poll_interval_secs: defaults::poll_interval_secs(),
            confirm_interval_ms: defaults::confirm_interval_ms(),
            confirm_timeout_secs: defaults::confirm_timeout_secs(),
            metadata_url: defaults::metadata_url(),
            whitelist_contract: defaults::whitelist_contract(),
            artifact_path: defaults::artifact_path(),
            deployer_account: String::new(),
        }
    }
}

mod defaults {
    pub fn rpc_url() -> String {
        if let Ok(url) = std::env::var("GATEWAY_RPC_URL") {
            if !url.is_empty() {
                return url;
            }
        }
        "http://127.0.0.1:8545".into()
    }

    pub fn chain_id() -> u64 {
        4
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    /// 0.01 ether.
    pub fn mint_price_wei() -> u64 {
        10_000_000_000_000_000
    }

    pub fn max_supply() -> u64 {
        20
    }

    pub fn poll_interval_secs() -> u64 {
        5
    }

    pub fn confirm_interval_ms() -> u64 {
        1_000
    }

    pub fn confirm_timeout_secs() -> u64 {
        120
    }

    pub fn metadata_url() -> String {
        "https://nft-collection-neon.vercel.app/api/".into()
    }

    pub fn whitelist_contract() -> String {
        "0xf0E80e02e8511bEf354fA12f8DE03ad56372BA43".into()
    }

    pub fn artifact_path() -> String {
        "./artifacts/CryptoDevs.json".into()
    }
}
