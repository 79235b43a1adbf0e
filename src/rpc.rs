//! JSON-RPC 2.0 transport.
//!
//! Deliberately thin: one endpoint, no failover, no automatic retry. Reads
//! fail soft at the contract layer and writes are user-re-initiated, so the
//! transport just reports what happened.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str) -> Self {
        info!(url, "RPC client initialized");
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, crate::Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "RPC request");
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method}: {e}")))?;
        let envelope: Value = response
            .json()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method}: invalid response body: {e}")))?;
        parse_response(method, envelope)
    }
}

/// Extract the `result` from a JSON-RPC envelope, mapping `error` objects.
fn parse_response(method: &str, envelope: Value) -> Result<Value, crate::Error> {
    if let Some(err) = envelope.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(crate::Error::Rpc(format!("{method}: {message}")));
    }
    envelope
        .get("result")
        .cloned()
        .ok_or_else(|| crate::Error::Rpc(format!("{method}: missing result")))
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(value: &Value) -> Result<u64, crate::Error> {
    let text = value
        .as_str()
        .ok_or_else(|| crate::Error::Rpc(format!("expected quantity string, got {value}")))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u64::from_str_radix(digits, 16)
        .map_err(|e| crate::Error::Rpc(format!("bad quantity {text}: {e}")))
}

/// Render a u64 as a `0x`-prefixed hex quantity.
pub fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}
