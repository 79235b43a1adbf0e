//! Response types for the gateway API.

use crate::phase::{Action, Connection, Phase, Snapshot};
use serde::Serialize;

/// Response from the action endpoints.
#[derive(Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(tx_hash: Option<String>) -> Self {
        Self {
            success: true,
            tx_hash,
            error: None,
        }
    }
}

/// Response from the state endpoint: the session snapshot plus the single
/// action the frontend should offer.
#[derive(Serialize)]
pub struct StateResponse {
    pub connection: Connection,
    pub phase: Phase,
    pub is_owner: bool,
    pub pending_tx: bool,
    pub minted: u64,
    pub max_supply: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_action: Option<Action>,
}

impl StateResponse {
    pub fn from_snapshot(snapshot: &Snapshot, max_supply: u64) -> Self {
        Self {
            connection: snapshot.connection,
            phase: snapshot.phase,
            is_owner: snapshot.is_owner,
            pending_tx: snapshot.pending_tx,
            minted: snapshot.minted,
            max_supply,
            available_action: snapshot.available_action(),
        }
    }
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub contract_address: String,
    pub chain_id: u64,
    pub uptime_secs: u64,
    pub requests: u64,
}
