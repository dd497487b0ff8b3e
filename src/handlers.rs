//! HTTP request handlers.

use crate::error::Error;
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::provider::SendOptions;
use crate::response::{BatchResponse, ErrorBody, HealthResponse, SendResponse};
use crate::state::AppState;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Health check with configuration presence flags. Always 200; the relay is
/// healthy as long as the process is alive, whether or not it is configured.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;
    let fee_payer_configured = match config.sponsor_mode {
        crate::config::SponsorMode::FeePayer => Some(config.fee_payer_configured()),
        crate::config::SponsorMode::Sponsored => None,
    };

    Json(HealthResponse {
        status: "healthy",
        gas_sponsorship: config.sponsor_mode.label(),
        privy_configured: config.privy_configured(),
        fee_payer_configured,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        METRICS.render(),
    )
}

/// Submit one signed transaction through the sponsored endpoint.
/// `POST /api/transfer/send-with-sponsor`
pub async fn send_with_sponsor(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let start = std::time::Instant::now();
    METRICS.tx_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let req_id = request_id(&request);
    let body = match parse_json_body(request, &state).await {
        Ok(v) => v,
        Err(resp) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            return resp;
        }
    };

    let blob = match require_base64_field(&body, "signedTransaction") {
        Ok(b) => b,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Rejected sponsored submission");
            return e.into_response();
        }
    };

    // Display only, never validated.
    let wallet = body
        .get("walletAddress")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(req_id = %req_id, wallet, "Relaying sponsored transaction");

    if !state.config.privy_configured() {
        METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        error!(req_id = %req_id, "Privy credentials missing, refusing submission");
        return Error::Config("Privy app credentials not configured".into()).into_response();
    }

    match state
        .provider
        .send_sponsored(&blob, &SendOptions::confirmed())
        .await
    {
        Ok(signature) => {
            METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
            METRICS.record_tx_duration(start);
            let explorer = state.rpc.network().explorer_url(&signature);
            info!(req_id = %req_id, signature = %signature, "Sponsored transaction submitted");
            (
                StatusCode::OK,
                Json(SendResponse::new(
                    signature,
                    "Transaction submitted with sponsored gas",
                    explorer,
                )),
            )
                .into_response()
        }
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            METRICS.record_tx_duration(start);
            error!(req_id = %req_id, error = %e, "Sponsored submission failed");
            e.into_response()
        }
    }
}

/// Co-sign a partially-signed transaction with the managed fee-payer wallet,
/// broadcast it, and wait for "confirmed" commitment.
/// `POST /api/transfer/signed-transaction-gasless` (fee-payer mode)
pub async fn gasless_fee_payer(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let start = std::time::Instant::now();
    METRICS.tx_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let req_id = request_id(&request);
    let body = match parse_json_body(request, &state).await {
        Ok(v) => v,
        Err(resp) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            return resp;
        }
    };

    let blob = match require_base64_field(&body, "serializedTransaction") {
        Ok(b) => b,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Rejected gasless submission");
            return e.into_response();
        }
    };

    let wallet = body
        .get("walletAddress")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(req_id = %req_id, wallet, "Relaying fee-payer transaction");

    // App credentials and the fee-payer wallet are reported independently:
    // operators may have configured one without the other.
    if !state.config.privy_configured() {
        METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        error!(req_id = %req_id, "Privy credentials missing, refusing co-sign");
        return gasless_failure(
            &state,
            Error::Config("Privy app credentials not configured".into()),
            Some("Set RELAY_PRIVY_APP_ID and RELAY_PRIVY_APP_SECRET"),
        );
    }
    if !state.config.fee_payer_configured() {
        METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        error!(req_id = %req_id, "Fee payer wallet missing, refusing co-sign");
        return gasless_failure(
            &state,
            Error::Config("Fee payer wallet not configured".into()),
            Some("Set RELAY_FEE_PAYER_WALLET_ID to the managed wallet id"),
        );
    }

    let signed = match state
        .provider
        .cosign(&blob, &state.config.fee_payer_wallet_id)
        .await
    {
        Ok(s) => s,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            METRICS.record_tx_duration(start);
            error!(req_id = %req_id, error = %e, "Fee payer co-signing failed");
            return gasless_failure(&state, e, None);
        }
    };

    let signature = match state.rpc.send_transaction(&signed).await {
        Ok(sig) => sig,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            METRICS.record_tx_duration(start);
            error!(req_id = %req_id, error = %e, "Broadcast failed");
            return gasless_failure(&state, e, None);
        }
    };

    if let Err(e) = state.rpc.confirm(&signature).await {
        METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        METRICS.record_tx_duration(start);
        error!(req_id = %req_id, signature = %signature, error = %e, "Confirmation failed");
        return gasless_failure(&state, e, None);
    }

    METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
    METRICS.record_tx_duration(start);
    let explorer = state.rpc.network().explorer_url(&signature);
    info!(req_id = %req_id, signature = %signature, "Fee-payer transaction confirmed");
    (
        StatusCode::OK,
        Json(SendResponse::new(
            signature,
            "Transaction confirmed with managed fee payer",
            explorer,
        )),
    )
        .into_response()
}

/// Submit an ordered batch of signed transactions through the sponsored
/// endpoint, sequentially, aborting on the first failure.
/// `POST /api/transfer/signed-transaction-gasless` (sponsored mode)
pub async fn gasless_batch(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let start = std::time::Instant::now();
    METRICS.tx_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let req_id = request_id(&request);
    let body = match parse_json_body(request, &state).await {
        Ok(v) => v,
        Err(resp) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            return resp;
        }
    };

    let txs = match require_base64_array(&body, "signedTx") {
        Ok(t) => t,
        Err(e) => {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Rejected batch submission");
            return e.into_response();
        }
    };

    if !state.config.privy_configured() {
        METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        error!(req_id = %req_id, "Privy credentials missing, refusing batch");
        return Error::Config("Privy app credentials not configured".into()).into_response();
    }

    info!(req_id = %req_id, count = txs.len(), "Relaying transaction batch");

    // Sequential by contract: the provider expects ordered, one-at-a-time
    // submission. Never parallelize this loop.
    let total = txs.len();
    let mut signatures = Vec::with_capacity(total);
    for (i, blob) in txs.iter().enumerate() {
        match state.provider.send_sponsored(blob, &SendOptions::batch()).await {
            Ok(sig) => {
                METRICS.batch_items.fetch_add(1, Ordering::Relaxed);
                signatures.push(sig);
            }
            Err(e) => {
                METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
                METRICS.record_tx_duration(start);
                // All-or-nothing response: earlier signatures are logged but
                // never returned to the caller.
                if !signatures.is_empty() {
                    warn!(
                        req_id = %req_id,
                        submitted = signatures.len(),
                        signatures = ?signatures,
                        "Batch aborted with earlier items already submitted"
                    );
                }
                error!(req_id = %req_id, item = i + 1, total, error = %e, "Batch item failed");
                return Error::Provider(format!("transaction {}/{total} failed: {e}", i + 1))
                    .into_response();
            }
        }
    }

    METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
    METRICS.record_tx_duration(start);
    info!(req_id = %req_id, count = signatures.len(), "Batch submitted");
    (StatusCode::OK, Json(BatchResponse::new(signatures))).into_response()
}

// --- Helpers ---

/// Extract correlation ID (set by middleware).
fn request_id(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default()
}

/// Parse the JSON body, mapping extractor failures to the 400 contract.
async fn parse_json_body(request: Request, state: &Arc<AppState>) -> Result<Value, Response> {
    match axum::Json::<Value>::from_request(request, state).await {
        Ok(axum::Json(v)) => Ok(v),
        Err(e) => {
            warn!(error = %e, "Invalid JSON body");
            Err(Error::Validation("Invalid JSON body".into()).into_response())
        }
    }
}

/// A required non-empty base64 string field. Syntactic check only; semantic
/// transaction validity is the provider's and network's responsibility.
fn require_base64_field(body: &Value, field: &str) -> Result<String, Error> {
    let value = body
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation(format!("Missing {field} field")))?;

    if B64.decode(value).is_err() {
        return Err(Error::Validation(format!("{field} is not valid base64")));
    }
    Ok(value.to_string())
}

/// A required non-empty array of base64 strings. Validated up front so a
/// malformed item never triggers a partial submission.
fn require_base64_array(body: &Value, field: &str) -> Result<Vec<String>, Error> {
    let items = body
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Validation(format!("Missing {field} array")))?;

    if items.is_empty() {
        return Err(Error::Validation(format!("{field} must be a non-empty array")));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let s = item
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::Validation(format!("{field}[{i}] must be a string")))?;
            if B64.decode(s).is_err() {
                return Err(Error::Validation(format!("{field}[{i}] is not valid base64")));
            }
            Ok(s.to_string())
        })
        .collect()
}

/// 500 body for the gasless endpoint: message plus presence flags (never the
/// secret values) so operators can see which credential is missing.
fn gasless_failure(state: &Arc<AppState>, error: Error, hint: Option<&str>) -> Response {
    let status = error.status();
    let mut body = ErrorBody::new(error.to_string()).with_debug(&state.config);
    if let Some(hint) = hint {
        body = body.with_hint(hint);
    }
    (status, Json(body)).into_response()
}
