//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Gateway error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// RPC communication error.
    Rpc(String),
    /// The wallet is connected to a chain other than the supported one.
    /// Fatal to the current operation; the user must switch networks.
    WrongNetwork { expected: u64, actual: u64 },
    /// Contract read failure. Swallowed at the reader boundary and treated
    /// as "no new information" — never shown to the user.
    Read(String),
    /// Transaction submission or confirmation failure. Not retried; the
    /// user must re-initiate.
    Write(String),
    /// Deployment failure (one-shot script, exits non-zero).
    Deploy(String),
    /// Action refused by the phase gate before reaching the writer.
    Rejected(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::WrongNetwork { expected, actual } => write!(
                f,
                "wrong network: connected to chain {actual}, switch to chain {expected}"
            ),
            Error::Read(msg) => write!(f, "read error: {msg}"),
            Error::Write(msg) => write!(f, "write error: {msg}"),
            Error::Deploy(msg) => write!(f, "deploy error: {msg}"),
            Error::Rejected(msg) => write!(f, "action rejected: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) | Error::Deploy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Rpc(_) | Error::Read(_) | Error::Write(_) => StatusCode::BAD_GATEWAY,
            Error::WrongNetwork { .. } | Error::Rejected(_) => StatusCode::CONFLICT,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
