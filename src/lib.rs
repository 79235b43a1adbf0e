//! # Presale Gateway
//!
//! Gateway service for an NFT presale dapp. A background synchronizer polls
//! the deployed contract for presale phase and mint count, derives the UI
//! phase from the reads, and gates user actions — start presale, presale
//! mint, public mint — by phase and wallet-connection status before relaying
//! them as transactions.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with metrics
//! - `GET /state` - Session snapshot and the single available action
//! - `POST /connect` - Wallet handshake
//! - `POST /presale/start` - Owner-only presale start
//! - `POST /presale/mint` - Mint during the presale window
//! - `POST /mint` - Public mint after the presale

pub mod abi;
pub mod config;
pub mod contract;
pub mod deploy;
mod error;
mod handlers;
pub mod phase;
mod response;
mod router;
pub mod rpc;
mod state;
pub mod sync;
pub mod wallet;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
