//! Error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Relay error type. Every failure is converted to a structured JSON response
/// at the handler boundary; nothing propagates as an unhandled fault.
#[derive(Debug)]
pub enum Error {
    /// Malformed or missing request input.
    Validation(String),
    /// Required credential or identifier absent from process configuration.
    Config(String),
    /// The provider rejected, errored, or returned malformed output.
    Provider(String),
    /// The network rejected broadcast or confirmation timed out.
    Network(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Provider(_) | Error::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "{msg}"),
            Error::Config(msg) => write!(f, "{msg}"),
            Error::Provider(msg) => write!(f, "{msg}"),
            Error::Network(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            Error::Validation("missing field".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_side_errors_map_to_500() {
        for err in [
            Error::Config("missing credential".into()),
            Error::Provider("rejected".into()),
            Error::Network("timed out".into()),
        ] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_display_passes_message_through() {
        let err = Error::Provider("Transaction already processed".into());
        assert_eq!(err.to_string(), "Transaction already processed");
    }
}
