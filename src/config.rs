//! Relay configuration.
//!
//! Loaded once at startup from `relay.toml` (optional) and `RELAY_`-prefixed
//! environment variables, then held immutably for the process lifetime.

use serde::Deserialize;

/// Which gasless design the `/api/transfer/signed-transaction-gasless` route
/// is bound to. The two designs have different request/response shapes, so a
/// deployment picks exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SponsorMode {
    /// Privy-hosted sponsorship: batch of signed transactions, each relayed
    /// to the sponsored RPC endpoint.
    Sponsored,
    /// Managed fee-payer: Privy co-signs a partially-signed transaction with
    /// the configured wallet, the relay broadcasts it itself.
    FeePayer,
}

impl SponsorMode {
    /// Human-readable label reported by `/health`.
    pub fn label(&self) -> &'static str {
        match self {
            SponsorMode::Sponsored => "sponsored",
            SponsorMode::FeePayer => "fee-payer",
        }
    }
}

/// Configuration for the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Privy application id. Empty = not configured.
    #[serde(default)]
    pub privy_app_id: String,

    /// Privy application secret. Empty = not configured. Never logged.
    #[serde(default)]
    pub privy_app_secret: String,

    /// Managed fee-payer wallet id (fee-payer mode only).
    #[serde(default)]
    pub fee_payer_wallet_id: String,

    /// Target network name: "mainnet-beta" or "devnet".
    #[serde(default = "defaults::network")]
    pub network: String,

    #[serde(default = "defaults::sponsor_mode")]
    pub sponsor_mode: SponsorMode,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Privy API base URL. Overridable for tests / self-hosted gateways.
    #[serde(default = "defaults::provider_url")]
    pub provider_url: String,

    /// Solana RPC URL override. Empty = derive from `network`.
    #[serde(default)]
    pub rpc_url: String,
}

impl Config {
    /// Both Privy app credentials are present.
    pub fn privy_configured(&self) -> bool {
        !self.privy_app_id.is_empty() && !self.privy_app_secret.is_empty()
    }

    /// A managed fee-payer wallet id is present.
    pub fn fee_payer_configured(&self) -> bool {
        !self.fee_payer_wallet_id.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            privy_app_id: String::new(),
            privy_app_secret: String::new(),
            fee_payer_wallet_id: String::new(),
            network: defaults::network(),
            sponsor_mode: defaults::sponsor_mode(),
            bind_address: defaults::bind_address(),
            provider_url: defaults::provider_url(),
            rpc_url: String::new(),
        }
    }
}

mod defaults {
    use super::SponsorMode;

    pub fn network() -> String {
        "mainnet-beta".into()
    }

    pub fn sponsor_mode() -> SponsorMode {
        SponsorMode::Sponsored
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3000".into()
    }

    pub fn provider_url() -> String {
        "https://api.privy.io/v1".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network, "mainnet-beta");
        assert_eq!(config.sponsor_mode, SponsorMode::Sponsored);
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert!(!config.privy_configured());
        assert!(!config.fee_payer_configured());
    }

    #[test]
    fn test_privy_configured_requires_both_values() {
        let mut config = Config::default();
        config.privy_app_id = "app-id".into();
        assert!(!config.privy_configured());
        config.privy_app_secret = "app-secret".into();
        assert!(config.privy_configured());
    }

    #[test]
    fn test_sponsor_mode_deserializes_kebab_case() {
        let config: Config =
            serde_json::from_str(r#"{"sponsor_mode": "fee-payer"}"#).unwrap();
        assert_eq!(config.sponsor_mode, SponsorMode::FeePayer);
        assert_eq!(config.sponsor_mode.label(), "fee-payer");
    }
}
