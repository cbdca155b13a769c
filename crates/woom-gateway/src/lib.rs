// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the Woom registration service.
//!
//! The commerce platform calls the checkout route once an order is paid;
//! health and metrics are open for probes and scrapers.

pub mod auth;
pub mod handlers;
pub mod server;

use async_trait::async_trait;
use woom_core::{OrderId, WoomError};
use woom_pipeline::{CheckoutReport, Orchestrator};

pub use auth::AuthConfig;
pub use server::{GatewayState, HealthState, ServerConfig, router, start_server};

/// Whatever turns a paid order into scheduled registrations.
#[async_trait]
pub trait CheckoutTrigger: Send + Sync {
    async fn schedule_order(&self, order_id: OrderId) -> Result<CheckoutReport, WoomError>;
}

#[async_trait]
impl CheckoutTrigger for Orchestrator {
    async fn schedule_order(&self, order_id: OrderId) -> Result<CheckoutReport, WoomError> {
        Orchestrator::schedule_order(self, order_id).await
    }
}
