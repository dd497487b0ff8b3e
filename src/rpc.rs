//! Solana JSON-RPC client: broadcast and confirmation polling.
//!
//! Used only in fee-payer mode, where the relay broadcasts the co-signed
//! transaction itself instead of delegating to the provider's sponsored
//! endpoint.

use crate::error::Error;
use crate::metrics::METRICS;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

/// How long to wait for "confirmed" commitment before giving up.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Target Solana cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    MainnetBeta,
    Devnet,
}

impl Network {
    /// Map a configured network name onto a cluster. Anything other than
    /// "devnet" falls back to mainnet.
    pub fn from_name(name: &str) -> Self {
        match name {
            "devnet" => Network::Devnet,
            _ => Network::MainnetBeta,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
        }
    }

    /// Public RPC endpoint for the cluster.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
        }
    }

    /// Human-viewable explorer URL for a signature. Non-mainnet clusters
    /// carry a `cluster` query parameter.
    pub fn explorer_url(&self, signature: &str) -> String {
        match self {
            Network::MainnetBeta => {
                format!("https://explorer.solana.com/tx/{signature}")
            }
            Network::Devnet => {
                format!("https://explorer.solana.com/tx/{signature}?cluster=devnet")
            }
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<String>,
    err: Option<Value>,
}

/// Thin JSON-RPC client over the cluster's HTTP endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    network: Network,
}

impl RpcClient {
    /// `url` overrides the cluster's public endpoint when non-empty.
    pub fn new(http: reqwest::Client, url: &str, network: Network) -> Self {
        let url = if url.is_empty() {
            network.endpoint().to_string()
        } else {
            url.to_string()
        };
        Self { http, url, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
                Error::Network(format!("{method} request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("{method} HTTP {status}: {text}")));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("{method} returned non-JSON response: {e}")))?;

        if let Some(err) = parsed.error {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            return Err(Error::Network(err.message));
        }

        parsed
            .result
            .ok_or_else(|| Error::Network(format!("{method} response missing result")))
    }

    /// Broadcast a fully-signed base64 transaction. Returns the signature.
    pub async fn send_transaction(&self, tx_base64: &str) -> Result<String, Error> {
        let result = self
            .call(
                "sendTransaction",
                json!([tx_base64, { "encoding": "base64" }]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Network("sendTransaction returned a non-string result".into()))
    }

    /// Poll signature status until "confirmed" commitment or the deadline.
    pub async fn confirm(&self, signature: &str) -> Result<(), Error> {
        let deadline = tokio::time::Instant::now() + CONFIRM_TIMEOUT;

        loop {
            let result = self
                .call(
                    "getSignatureStatuses",
                    json!([[signature], { "searchTransactionHistory": false }]),
                )
                .await?;

            let status: Option<SignatureStatus> = result
                .get("value")
                .and_then(|v| v.get(0))
                .filter(|v| !v.is_null())
                .and_then(|v| serde_json::from_value(v.clone()).ok());

            if let Some(status) = status {
                if let Some(err) = status.err {
                    return Err(Error::Network(format!(
                        "transaction failed on-chain: {err}"
                    )));
                }
                match status.confirmation_status.as_deref() {
                    Some("confirmed") | Some("finalized") => {
                        debug!(signature, "Transaction confirmed");
                        return Ok(());
                    }
                    _ => {}
                }
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(signature, "Confirmation wait timed out");
                return Err(Error::Network(format!(
                    "confirmation timed out after {}s for {signature}",
                    CONFIRM_TIMEOUT.as_secs()
                )));
            }
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_name() {
        assert_eq!(Network::from_name("devnet"), Network::Devnet);
        assert_eq!(Network::from_name("mainnet-beta"), Network::MainnetBeta);
        // Unknown names fall back to mainnet
        assert_eq!(Network::from_name("unknown"), Network::MainnetBeta);
    }

    #[test]
    fn test_mainnet_explorer_url_has_no_cluster_param() {
        let url = Network::MainnetBeta.explorer_url("5Sig");
        assert_eq!(url, "https://explorer.solana.com/tx/5Sig");
    }

    #[test]
    fn test_devnet_explorer_url_carries_cluster_param() {
        let url = Network::Devnet.explorer_url("5Sig");
        assert_eq!(url, "https://explorer.solana.com/tx/5Sig?cluster=devnet");
    }

    #[test]
    fn test_url_override_beats_cluster_endpoint() {
        let client = RpcClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9999",
            Network::Devnet,
        );
        assert_eq!(client.url(), "http://127.0.0.1:9999");

        let default = RpcClient::new(reqwest::Client::new(), "", Network::Devnet);
        assert_eq!(default.url(), "https://api.devnet.solana.com");
    }
}
