//! Response types for the relay API.

use crate::config::Config;
use serde::Serialize;

/// Success envelope for single-transaction submissions.
#[derive(Serialize)]
pub struct SendResponse {
    pub data: SendData,
}

#[derive(Serialize)]
pub struct SendData {
    pub signature: String,
    pub message: String,
    pub explorer: String,
}

impl SendResponse {
    pub fn new(signature: String, message: impl Into<String>, explorer: String) -> Self {
        Self {
            data: SendData {
                signature,
                message: message.into(),
                explorer,
            },
        }
    }
}

/// Success envelope for batch submissions.
#[derive(Serialize)]
pub struct BatchResponse {
    pub data: BatchData,
}

#[derive(Serialize)]
pub struct BatchData {
    pub signatures: Vec<String>,
    pub count: usize,
    pub message: String,
}

impl BatchResponse {
    pub fn new(signatures: Vec<String>) -> Self {
        let count = signatures.len();
        Self {
            data: BatchData {
                signatures,
                count,
                message: format!("{count} transaction(s) submitted"),
            },
        }
    }
}

/// Error body for the gasless endpoint: message plus optional diagnosis
/// aids. `debug` reports which configuration values are present, never the
/// values themselves.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ConfigPresence>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hint: None,
            debug: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_debug(mut self, config: &Config) -> Self {
        self.debug = Some(ConfigPresence::from_config(config));
        self
    }
}

/// Boolean presence flags for each required configuration value.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPresence {
    pub privy_app_id: bool,
    pub privy_app_secret: bool,
    pub fee_payer_wallet_id: bool,
}

impl ConfigPresence {
    pub fn from_config(config: &Config) -> Self {
        Self {
            privy_app_id: !config.privy_app_id.is_empty(),
            privy_app_secret: !config.privy_app_secret.is_empty(),
            fee_payer_wallet_id: !config.fee_payer_wallet_id.is_empty(),
        }
    }
}

/// Response from the health endpoint. Always reported with HTTP 200.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub gas_sponsorship: &'static str,
    pub privy_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_payer_configured: Option<bool>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_omits_empty_optionals() {
        let body = serde_json::to_value(ErrorBody::new("boom")).unwrap();
        assert_eq!(body["error"], "boom");
        assert!(body.get("hint").is_none());
        assert!(body.get("debug").is_none());
    }

    #[test]
    fn test_config_presence_never_carries_values() {
        let mut config = Config::default();
        config.privy_app_id = "app-id".into();
        config.privy_app_secret = "s3cret".into();
        let body =
            serde_json::to_string(&ErrorBody::new("boom").with_debug(&config)).unwrap();
        assert!(body.contains("\"privyAppSecret\":true"));
        assert!(!body.contains("s3cret"));
    }

    #[test]
    fn test_batch_response_counts_signatures() {
        let resp = BatchResponse::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(resp.data.count, 3);
        assert_eq!(resp.data.signatures, vec!["a", "b", "c"]);
    }
}
