// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the orchestrator from configuration.

use std::sync::Arc;

use tracing::info;
use woom_commerce::WooCommerceStore;
use woom_config::WoomConfig;
use woom_core::{AuditLog, Clock, JoinLinkHandler, TaskScheduler, WoomError};
use woom_pipeline::{Collaborators, LogNotifier, Orchestrator, SchedulePolicy, WebhookNotifier};
use woom_storage::SqliteAuditLog;
use woom_zoom::{MemoryTokenStore, OAuthClient, RegistrationClient, TokenProvider};

/// Open the audit log when auditing is enabled.
pub async fn open_audit(config: &WoomConfig) -> Result<Option<Arc<SqliteAuditLog>>, WoomError> {
    if !config.storage.audit_enabled {
        info!("audit log disabled");
        return Ok(None);
    }
    let audit = SqliteAuditLog::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "audit log opened");
    Ok(Some(Arc::new(audit)))
}

fn notifier(config: &WoomConfig) -> Result<Arc<dyn JoinLinkHandler>, WoomError> {
    match config.notify.webhook_url.as_deref() {
        Some(url) => {
            info!(url, "join links will be posted to webhook");
            Ok(Arc::new(WebhookNotifier::new(
                url,
                config.zoom.request_timeout(),
            )?))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Wire every collaborator of the orchestrator.
pub fn build_orchestrator(
    config: &WoomConfig,
    scheduler: Arc<dyn TaskScheduler>,
    audit: Option<Arc<SqliteAuditLog>>,
    clock: Arc<dyn Clock>,
) -> Result<Orchestrator, WoomError> {
    let http = woom_zoom::http_client(&config.zoom)?;
    let tokens = TokenProvider::new(
        Arc::new(MemoryTokenStore::new(clock.clone())),
        OAuthClient::new(http.clone(), &config.zoom)?,
        clock.clone(),
        config.zoom.token_ttl(),
    );

    Ok(Orchestrator::new(
        Collaborators {
            commerce: Arc::new(WooCommerceStore::new(&config.commerce)?),
            tokens,
            registrar: RegistrationClient::new(http, &config.zoom),
            scheduler,
            notifier: notifier(config)?,
            audit: audit.map(|log| log as Arc<dyn AuditLog>),
            clock,
        },
        SchedulePolicy::from(&config.schedule),
    ))
}
