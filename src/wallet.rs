//! Wallet connector: chain-checked handle acquisition.
//!
//! Every handle acquisition re-verifies the chain id — the provider can be
//! switched to another network between calls. The account handshake happens
//! at most once per session; later signing handles reuse the cached account.

use crate::abi::Address;
use crate::rpc::{self, RpcClient};
use crate::Error;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Capability level requested from the wallet provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// A network handle. `signer` is set for write-capable handles.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub signer: Option<Address>,
}

pub struct Wallet {
    rpc: Arc<RpcClient>,
    expected_chain_id: u64,
    session: tokio::sync::OnceCell<Address>,
}

impl Wallet {
    pub fn new(rpc: Arc<RpcClient>, expected_chain_id: u64) -> Self {
        Self {
            rpc,
            expected_chain_id,
            session: tokio::sync::OnceCell::new(),
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Acquire a read- or write-capable handle.
    ///
    /// Fails with [`Error::WrongNetwork`] when the provider is on any chain
    /// other than the supported one; the caller aborts and surfaces the
    /// mismatch to the user.
    pub async fn acquire(&self, access: Access) -> Result<Handle, Error> {
        let chain = self.chain_id().await?;
        if chain != self.expected_chain_id {
            warn!(
                expected = self.expected_chain_id,
                actual = chain,
                "Wallet is on the wrong network"
            );
            return Err(Error::WrongNetwork {
                expected: self.expected_chain_id,
                actual: chain,
            });
        }
        match access {
            Access::Read => Ok(Handle { signer: None }),
            Access::Write => {
                let signer = self
                    .session
                    .get_or_try_init(|| self.request_account())
                    .await?;
                Ok(Handle {
                    signer: Some(*signer),
                })
            }
        }
    }

    async fn chain_id(&self) -> Result<u64, Error> {
        let result = self.rpc.request("eth_chainId", json!([])).await?;
        rpc::parse_quantity(&result)
    }

    /// First call per session prompts the wallet extension; the resolved
    /// account is cached so later calls never re-prompt.
    async fn request_account(&self) -> Result<Address, Error> {
        let result = self.rpc.request("eth_requestAccounts", json!([])).await?;
        let first = result
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Rpc("eth_requestAccounts: no accounts exposed".into()))?;
        let account: Address = first.parse()?;
        info!(account = %account, "Wallet session established");
        Ok(account)
    }
}

/// The handshake seam the synchronizer depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Perform (or reuse) the wallet handshake for a signing session.
    async fn connect(&self) -> Result<(), Error>;
}

#[async_trait]
impl WalletConnector for Wallet {
    async fn connect(&self) -> Result<(), Error> {
        self.acquire(Access::Write).await.map(|_| ())
    }
}
