// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use woom_core::WoomError;

use crate::CheckoutTrigger;
use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for the authenticated routes.
#[derive(Clone)]
pub struct GatewayState {
    pub checkout: Arc<dyn CheckoutTrigger>,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Routes:
/// - GET /health
/// - GET /metrics
/// - POST /v1/orders/{order_id}/checkout (bearer auth)
pub fn router(state: GatewayState, health: HealthState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(health);

    let api_routes = Router::new()
        .route("/v1/orders/{order_id}/checkout", post(handlers::post_checkout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    health: HealthState,
    cancel: CancellationToken,
) -> Result<(), WoomError> {
    let app = router(state, health);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WoomError::Http {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| WoomError::Http {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
