//! One-shot contract deployment.
//!
//! Reads the compiled artifact, appends the `(metadata_url, whitelist)`
//! constructor arguments, submits the deploy transaction, and waits for the
//! receipt that carries the new contract address. No retry, no state.

use crate::abi::{self, Address};
use crate::config::Config;
use crate::rpc::{self, RpcClient};
use crate::Error;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

/// The slice of a compiler artifact the deployer needs.
#[derive(Deserialize)]
struct Artifact {
    bytecode: String,
}

/// Deploy the NFT contract and return its address.
pub async fn deploy(config: &Config, rpc: &RpcClient) -> Result<Address, Error> {
    let chain = rpc
        .request("eth_chainId", json!([]))
        .await
        .and_then(|v| rpc::parse_quantity(&v))?;
    if chain != config.chain_id {
        return Err(Error::WrongNetwork {
            expected: config.chain_id,
            actual: chain,
        });
    }

    let whitelist: Address = config.whitelist_contract.parse()?;
    let raw = std::fs::read_to_string(&config.artifact_path)
        .map_err(|e| Error::Deploy(format!("artifact {}: {e}", config.artifact_path)))?;
    let artifact: Artifact = serde_json::from_str(&raw)
        .map_err(|e| Error::Deploy(format!("artifact {}: {e}", config.artifact_path)))?;

    let from = deployer_account(config, rpc).await?;
    let data = deployment_data(&artifact.bytecode, &config.metadata_url, &whitelist)?;

    info!(
        from = %from,
        whitelist = %whitelist,
        metadata = %config.metadata_url,
        "Submitting deploy transaction"
    );

    let result = rpc
        .request(
            "eth_sendTransaction",
            json!([{ "from": from.to_string(), "data": data }]),
        )
        .await
        .map_err(|e| Error::Deploy(e.to_string()))?;
    let hash = result
        .as_str()
        .ok_or_else(|| Error::Deploy("non-string transaction hash".into()))?
        .to_owned();

    info!(tx = %hash, "Waiting for deployment receipt");
    let address = wait_for_address(rpc, &hash, config).await?;
    info!(address = %address, "Contract deployed");
    Ok(address)
}

/// Contract creation calldata: bytecode followed by the encoded constructor
/// arguments.
fn deployment_data(
    bytecode: &str,
    metadata_url: &str,
    whitelist: &Address,
) -> Result<String, Error> {
    let code = bytecode.strip_prefix("0x").unwrap_or(bytecode);
    if code.is_empty() {
        return Err(Error::Deploy("artifact has empty bytecode".into()));
    }
    let args = abi::encode_constructor_args(metadata_url, whitelist);
    Ok(format!("0x{code}{}", hex::encode(args)))
}

async fn deployer_account(config: &Config, rpc: &RpcClient) -> Result<Address, Error> {
    if !config.deployer_account.is_empty() {
        return config.deployer_account.parse();
    }
    let accounts = rpc.request("eth_accounts", json!([])).await?;
    accounts
        .get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Deploy("node exposes no accounts; set deployer_account".into()))?
        .parse()
}

async fn wait_for_address(rpc: &RpcClient, hash: &str, config: &Config) -> Result<Address, Error> {
    let deadline =
        tokio::time::Instant::now() + Duration::from_secs(config.confirm_timeout_secs);
    loop {
        let receipt = rpc
            .request("eth_getTransactionReceipt", json!([hash]))
            .await
            .map_err(|e| Error::Deploy(e.to_string()))?;
        if !receipt.is_null() {
            let status = receipt
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("0x1");
            if status == "0x0" {
                return Err(Error::Deploy(format!("deploy transaction {hash} reverted")));
            }
            return receipt
                .get("contractAddress")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Deploy("receipt carries no contract address".into()))?
                .parse();
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(Error::Deploy(format!(
                "deploy transaction {hash} not confirmed within {}s",
                config.confirm_timeout_secs
            )));
        }
        tokio::time::sleep(Duration::from_millis(config.confirm_interval_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_data_appends_constructor_args() {
        let whitelist: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        let data = deployment_data("0x6080604052", "https://example.com/", &whitelist).unwrap();
        assert!(data.starts_with("0x6080604052"));
        // Head words: string offset then the whitelist address.
        let args = &data["0x6080604052".len()..];
        assert_eq!(&args[..64], &format!("{:0>64}", "40"));
        assert!(args[64..128].ends_with("f0e80e02e8511bef354fa12f8de03ad56372ba43"));
    }

    #[test]
    fn test_deployment_data_rejects_empty_bytecode() {
        let whitelist: Address = "0xf0e80e02e8511bef354fa12f8de03ad56372ba43"
            .parse()
            .unwrap();
        assert!(deployment_data("0x", "https://example.com/", &whitelist).is_err());
        assert!(deployment_data("", "https://example.com/", &whitelist).is_err());
    }
}
