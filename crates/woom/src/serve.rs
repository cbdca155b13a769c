// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `woom serve`: the long-running registration service.
//!
//! Starts the task dispatcher and the HTTP gateway, then waits for a
//! shutdown signal. Pending timers live in memory only and are dropped on
//! shutdown.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info, warn};
use woom_config::WoomConfig;
use woom_core::{Clock, SystemClock, WoomError};
use woom_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use woom_scheduler::TokioScheduler;

use crate::shutdown;
use crate::wiring;

pub async fn run_serve(config: WoomConfig) -> Result<(), WoomError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting woom serve");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| WoomError::Internal(format!("failed to install Prometheus recorder: {e}")))?;
    woom_pipeline::register_metrics();
    debug!("prometheus metrics recorder installed");

    let cancel = shutdown::install_signal_handler();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = TokioScheduler::new(clock.clone(), cancel.child_token());

    let audit = wiring::open_audit(&config).await?;
    let orchestrator = Arc::new(wiring::build_orchestrator(
        &config,
        Arc::new(scheduler.clone()),
        audit.clone(),
        clock,
    )?);

    let dispatcher = scheduler.start(orchestrator.clone(), config.schedule.max_concurrent_tasks)?;

    let gateway = if config.gateway.enabled {
        if config.gateway.bearer_token.is_none() {
            warn!("gateway.bearer_token is not set -- the checkout route will reject every request");
        }
        let handle = prometheus.clone();
        let health = HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render: Some(Arc::new(move || handle.render())),
        };
        let state = GatewayState {
            checkout: orchestrator.clone(),
            auth: AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
        };
        let server_config = ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        };
        let gateway_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) =
                woom_gateway::start_server(&server_config, state, health, gateway_cancel.clone())
                    .await
            {
                tracing::error!(error = %e, "gateway stopped");
                gateway_cancel.cancel();
            }
        }))
    } else {
        info!("gateway disabled");
        None
    };

    cancel.cancelled().await;

    let pending = scheduler.pending();
    if pending > 0 {
        warn!(pending, "dropping registrations that have not fired yet");
    }
    scheduler.shutdown().await;
    if let Err(e) = dispatcher.await {
        warn!(error = %e, "task dispatcher did not stop cleanly");
    }
    if let Some(gateway) = gateway {
        if let Err(e) = gateway.await {
            warn!(error = %e, "gateway task did not stop cleanly");
        }
    }

    drop(orchestrator);
    if let Some(audit) = audit {
        match Arc::try_unwrap(audit) {
            Ok(audit) => audit.close().await?,
            Err(_) => debug!("audit log still shared, skipping checkpoint"),
        }
    }

    info!("woom serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("woom={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
