//! Privy API client.
//!
//! Two call paths: the sponsored JSON-RPC endpoint (Privy broadcasts and pays
//! the fee) and the managed-wallet API (Privy co-signs with the configured
//! fee-payer wallet, the relay broadcasts). Both authenticate with basic auth
//! over the app credentials plus the `privy-app-id` header.

use crate::error::Error;
use crate::metrics::METRICS;
use crate::rpc::Network;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use tracing::debug;

/// Submission options forwarded with every sponsored `sendTransaction`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    encoding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    preflight_commitment: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_preflight: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sponsor: Option<bool>,
}

impl SendOptions {
    /// Single submission: wait for preflight at "confirmed" commitment.
    pub fn confirmed() -> Self {
        Self {
            encoding: "base64",
            preflight_commitment: Some("confirmed"),
            skip_preflight: None,
            max_retries: None,
            sponsor: None,
        }
    }

    /// Batch submission: skip preflight, up to 3 provider-side retries,
    /// sponsorship requested explicitly.
    pub fn batch() -> Self {
        Self {
            encoding: "base64",
            preflight_commitment: None,
            skip_preflight: Some(true),
            max_retries: Some(3),
            sponsor: Some(true),
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: (&'a str, &'a SendOptions),
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    message: String,
}

#[derive(Serialize)]
struct SignTransactionRequest<'a> {
    method: &'static str,
    params: SignTransactionParams<'a>,
}

#[derive(Serialize)]
struct SignTransactionParams<'a> {
    transaction: &'a str,
    encoding: &'static str,
}

#[derive(Deserialize)]
struct SignTransactionResponse {
    data: SignTransactionData,
}

#[derive(Deserialize)]
struct SignTransactionData {
    signed_transaction: String,
}

/// Privy API client. Credentials are fixed at construction.
pub struct ProviderClient {
    http: reqwest::Client,
    sponsored_url: String,
    wallet_base_url: String,
    app_id: String,
    app_secret: String,
}

impl ProviderClient {
    pub fn new(http: reqwest::Client, base_url: &str, network: Network, app_id: &str, app_secret: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http,
            sponsored_url: format!("{base}/rpc/solana/{}", network.name()),
            wallet_base_url: format!("{base}/wallets"),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
        }
    }

    /// Submit a signed transaction through the sponsored endpoint. Privy
    /// broadcasts it and covers the fee. Returns the signature. No local
    /// retries: provider errors pass through verbatim.
    pub async fn send_sponsored(
        &self,
        tx_base64: &str,
        options: &SendOptions,
    ) -> Result<String, Error> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "sendTransaction",
            params: (tx_base64, options),
        };

        let response = self
            .http
            .post(&self.sponsored_url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header("privy-app-id", &self.app_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failure(format!("sponsored sendTransaction failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.failure(format!("provider HTTP {status}: {text}")));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| self.failure(format!("provider returned non-JSON response: {e}")))?;

        if let Some(err) = parsed.error {
            // Pass the provider's message through unchanged, including
            // "already processed" rejections.
            return Err(self.failure(err.message));
        }

        let signature = parsed
            .result
            .ok_or_else(|| self.failure("provider response missing result".into()))?;

        debug!(signature = %signature, "Sponsored submission accepted");
        Ok(signature)
    }

    /// Ask Privy to co-sign a partially-signed transaction with the managed
    /// fee-payer wallet. Returns the fully-signed base64 blob. The relay does
    /// no cryptographic validation of either blob.
    pub async fn cosign(&self, tx_base64: &str, wallet_id: &str) -> Result<String, Error> {
        let url = format!("{}/{wallet_id}/rpc", self.wallet_base_url);
        let body = SignTransactionRequest {
            method: "signTransaction",
            params: SignTransactionParams {
                transaction: tx_base64,
                encoding: "base64",
            },
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header("privy-app-id", &self.app_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failure(format!("co-sign request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.failure(format!("co-sign HTTP {status}: {text}")));
        }

        let parsed: SignTransactionResponse = response
            .json()
            .await
            .map_err(|e| self.failure(format!("co-sign returned malformed response: {e}")))?;

        debug!(wallet_id, "Fee payer co-signature obtained");
        Ok(parsed.data.signed_transaction)
    }

    fn failure(&self, message: String) -> Error {
        METRICS.provider_errors.fetch_add(1, Ordering::Relaxed);
        Error::Provider(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_options_request_preflight() {
        let json = serde_json::to_value(SendOptions::confirmed()).unwrap();
        assert_eq!(json["encoding"], "base64");
        assert_eq!(json["preflightCommitment"], "confirmed");
        assert!(json.get("skipPreflight").is_none());
        assert!(json.get("maxRetries").is_none());
    }

    #[test]
    fn test_batch_options_delegate_retries_to_provider() {
        let json = serde_json::to_value(SendOptions::batch()).unwrap();
        assert_eq!(json["skipPreflight"], true);
        assert_eq!(json["maxRetries"], 3);
        assert_eq!(json["sponsor"], true);
        assert!(json.get("preflightCommitment").is_none());
    }

    #[test]
    fn test_sponsored_url_encodes_network() {
        let client = ProviderClient::new(
            reqwest::Client::new(),
            "https://api.privy.io/v1/",
            Network::Devnet,
            "app",
            "secret",
        );
        assert_eq!(client.sponsored_url, "https://api.privy.io/v1/rpc/solana/devnet");
        assert_eq!(client.wallet_base_url, "https://api.privy.io/v1/wallets");
    }
}
