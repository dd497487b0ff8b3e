//! Application state shared across handlers.

use crate::config::Config;
use crate::provider::ProviderClient;
use crate::rpc::{Network, RpcClient};
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state. Configuration is immutable after construction;
/// handlers only touch atomic counters.
pub struct AppState {
    pub config: Config,
    pub provider: ProviderClient,
    pub rpc: RpcClient,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| crate::Error::Config(format!("HTTP client build failed: {e}")))?;

        let network = Network::from_name(&config.network);
        let provider = ProviderClient::new(
            http.clone(),
            &config.provider_url,
            network,
            &config.privy_app_id,
            &config.privy_app_secret,
        );
        let rpc = RpcClient::new(http, &config.rpc_url, network);

        info!(
            network = network.name(),
            mode = config.sponsor_mode.label(),
            privy_configured = config.privy_configured(),
            "Relay state initialized"
        );

        Ok(Self {
            config,
            provider,
            rpc,
            request_count: AtomicU64::new(0),
        })
    }
}
