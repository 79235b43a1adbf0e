//! Contract reader and writer over the fixed NFT ABI.

use crate::abi::{self, Address};
use crate::config::Config;
use crate::rpc;
use crate::wallet::{Access, Wallet};
use crate::Error;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub type TxHash = String;

/// The dapp-facing surface of the deployed NFT contract.
///
/// Reads are fail-soft: any transport or decode failure is caught, logged,
/// and reported as "no new information" rather than propagated. Writes
/// surface errors to the caller and are never retried automatically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MintContract: Send + Sync {
    async fn presale_started(&self) -> bool;
    async fn presale_end_timestamp(&self) -> Option<u64>;
    /// Whether the connected account is the contract owner. `None` when
    /// either side of the comparison could not be resolved.
    async fn caller_is_owner(&self) -> Option<bool>;
    async fn token_ids(&self) -> Option<u64>;

    /// Owner-only, no value attached.
    async fn start_presale(&self) -> Result<TxHash, Error>;
    /// Payable at the fixed price; legal during the presale window.
    async fn presale_mint(&self) -> Result<TxHash, Error>;
    /// Payable at the fixed price; legal after the presale has ended.
    async fn public_mint(&self) -> Result<TxHash, Error>;
}

pub struct NftContract {
    wallet: Arc<Wallet>,
    address: Address,
    mint_price_wei: u64,
    confirm_interval: Duration,
    confirm_timeout: Duration,
}

impl NftContract {
    pub fn new(wallet: Arc<Wallet>, config: &Config) -> Result<Self, Error> {
        if config.contract_address.is_empty() {
            return Err(Error::Config(
                "contract_address is not set (deploy first, then configure the gateway)".into(),
            ));
        }
        Ok(Self {
            wallet,
            address: config.contract_address.parse()?,
            mint_price_wei: config.mint_price_wei,
            confirm_interval: Duration::from_millis(config.confirm_interval_ms),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
        })
    }

    /// `eth_call` a nullary method, returning the raw hex return data.
    async fn view(&self, signature: &str) -> Result<String, Error> {
        self.wallet.acquire(Access::Read).await?;
        let params = json!([
            {
                "to": self.address.to_string(),
                "data": abi::encode_call(signature),
            },
            "latest",
        ]);
        let result = self.wallet.rpc().request("eth_call", params).await?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::Read(format!("{signature}: non-string return data")))
    }

    /// Submit a state-changing call and block until one confirmation.
    async fn transact(&self, signature: &str, value_wei: u64) -> Result<TxHash, Error> {
        let handle = self.wallet.acquire(Access::Write).await?;
        let from = handle
            .signer
            .ok_or_else(|| Error::Write("no signing account".into()))?;

        let mut tx = json!({
            "from": from.to_string(),
            "to": self.address.to_string(),
            "data": abi::encode_call(signature),
        });
        if value_wei > 0 {
            tx["value"] = Value::String(rpc::quantity(value_wei));
        }

        let result = self
            .wallet
            .rpc()
            .request("eth_sendTransaction", json!([tx]))
            .await
            .map_err(|e| Error::Write(format!("{signature}: {e}")))?;
        let hash = result
            .as_str()
            .ok_or_else(|| Error::Write(format!("{signature}: non-string transaction hash")))?
            .to_owned();

        info!(method = signature, tx = %hash, "Transaction submitted, awaiting confirmation");
        self.wait_for_confirmation(&hash).await?;
        Ok(hash)
    }

    /// Poll the receipt until the transaction is included (one confirmation).
    async fn wait_for_confirmation(&self, hash: &str) -> Result<(), Error> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            let receipt = self
                .wallet
                .rpc()
                .request("eth_getTransactionReceipt", json!([hash]))
                .await
                .map_err(|e| Error::Write(format!("receipt query for {hash}: {e}")))?;
            if !receipt.is_null() {
                let status = receipt
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("0x1");
                if status == "0x0" {
                    return Err(Error::Write(format!("transaction {hash} reverted")));
                }
                info!(tx = hash, "Transaction confirmed");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Write(format!(
                    "transaction {hash} not confirmed within {}s",
                    self.confirm_timeout.as_secs()
                )));
            }
            tokio::time::sleep(self.confirm_interval).await;
        }
    }
}

#[async_trait]
impl MintContract for NftContract {
    async fn presale_started(&self) -> bool {
        match self
            .view("presaleStarted()")
            .await
            .and_then(|data| abi::decode_bool(&data))
        {
            Ok(started) => started,
            Err(e) => {
                warn!(error = %e, "presaleStarted read failed");
                false
            }
        }
    }

    async fn presale_end_timestamp(&self) -> Option<u64> {
        match self
            .view("presaleEndTimestamp()")
            .await
            .and_then(|data| abi::decode_u64(&data))
        {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                warn!(error = %e, "presaleEndTimestamp read failed");
                None
            }
        }
    }

    async fn caller_is_owner(&self) -> Option<bool> {
        // Resolving the connected account may prompt the wallet once.
        let handle = match self.wallet.acquire(Access::Write).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "owner check: no signing account");
                return None;
            }
        };
        let signer = handle.signer?;
        match self
            .view("owner()")
            .await
            .and_then(|data| abi::decode_address(&data))
        {
            // Byte equality, so checksum casing never matters.
            Ok(owner) => Some(owner == signer),
            Err(e) => {
                warn!(error = %e, "owner read failed");
                None
            }
        }
    }

    async fn token_ids(&self) -> Option<u64> {
        match self
            .view("tokenIds()")
            .await
            .and_then(|data| abi::decode_u64(&data))
        {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "tokenIds read failed");
                None
            }
        }
    }

    async fn start_presale(&self) -> Result<TxHash, Error> {
        self.transact("startPresale()", 0).await
    }

    async fn presale_mint(&self) -> Result<TxHash, Error> {
        self.transact("presaleMint()", self.mint_price_wei).await
    }

    async fn public_mint(&self) -> Result<TxHash, Error> {
        self.transact("mint()", self.mint_price_wei).await
    }
}
