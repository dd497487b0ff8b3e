//! HTTP router setup.

use crate::config::SponsorMode;
use crate::handlers;
use crate::middleware::inject_request_id;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router. The gasless route is bound to exactly one
/// of the two gasless designs, selected by the configured sponsorship mode;
/// their request/response shapes differ and cannot share a deployment.
pub fn create(state: Arc<AppState>) -> Router {
    let gasless = match state.config.sponsor_mode {
        SponsorMode::Sponsored => post(handlers::gasless_batch),
        SponsorMode::FeePayer => post(handlers::gasless_fee_payer),
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/transfer/send-with-sponsor",
            post(handlers::send_with_sponsor),
        )
        .route("/api/transfer/signed-transaction-gasless", gasless)
        .layer(axum::middleware::from_fn(inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .with_state(state)
}
