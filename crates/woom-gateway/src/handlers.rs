// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles GET /health, GET /metrics, POST /v1/orders/{order_id}/checkout.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use woom_core::{OrderId, WoomError};

use crate::server::{GatewayState, HealthState};

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn get_health(State(health): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text exposition, or 404 when no recorder is installed.
pub async fn get_metrics(State(health): State<HealthState>) -> Response {
    match &health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "metrics not enabled".to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /v1/orders/{order_id}/checkout
///
/// Schedules registration for every webinar line item of the order and
/// returns the per-item report.
pub async fn post_checkout(
    State(state): State<GatewayState>,
    Path(order_id): Path<u64>,
) -> Response {
    match state.checkout.schedule_order(OrderId(order_id)).await {
        Ok(report) => (StatusCode::ACCEPTED, Json(report)).into_response(),
        Err(e @ WoomError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(order_id, error = %e, "checkout scheduling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
