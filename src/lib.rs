//! # Sponsor Relay
//!
//! A thin relay for gas-sponsored Solana transactions. Accepts client-signed
//! transactions over HTTP and forwards them to Privy, which sponsors the
//! network fee (or co-signs with a managed fee-payer wallet).
//!
//! ## Endpoints
//! - `GET /health` - Liveness and configuration presence
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/transfer/send-with-sponsor` - Submit one sponsored transaction
//! - `POST /api/transfer/signed-transaction-gasless` - Batch submit, or
//!   fee-payer co-signing, depending on the configured sponsorship mode

pub mod config;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
pub mod provider;
mod response;
mod router;
pub mod rpc;
mod state;

pub use config::{Config, SponsorMode};
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
