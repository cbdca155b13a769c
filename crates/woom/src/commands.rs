// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot commands: `process`, `audit`, `check-config`.

use std::sync::Arc;

use serde::Serialize;
use woom_config::WoomConfig;
use woom_core::{
    AuditLog, AuditRecord, Clock, ItemId, OrderId, RegistrationTask, SystemClock, WoomError,
};
use woom_pipeline::{AttemptOutcome, CollectingScheduler};
use woom_storage::SqliteAuditLog;

use crate::wiring;

#[derive(Debug, Serialize)]
struct ProcessReport {
    outcome: AttemptOutcome,
    /// Follow-up attempts the run asked for. They are not executed.
    follow_ups: Vec<FollowUp>,
}

#[derive(Debug, Serialize)]
struct FollowUp {
    fire_at: chrono::DateTime<chrono::Utc>,
    task: RegistrationTask,
}

/// Run one attempt for an order line item right now.
pub async fn run_process(
    config: WoomConfig,
    order_id: u64,
    item_id: u64,
    previous_status_code: i64,
) -> Result<(), WoomError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Arc::new(CollectingScheduler::new());
    let audit = wiring::open_audit(&config).await?;
    let orchestrator =
        wiring::build_orchestrator(&config, scheduler.clone(), audit.clone(), clock)?;

    let task =
        RegistrationTask::new(OrderId(order_id), ItemId(item_id)).carrying(previous_status_code);
    let outcome = orchestrator.process_task(task).await?;

    let report = ProcessReport {
        outcome,
        follow_ups: scheduler
            .take()
            .await
            .into_iter()
            .map(|(fire_at, task)| FollowUp { fire_at, task })
            .collect(),
    };
    println!("{}", to_json(&report)?);

    drop(orchestrator);
    close_audit(audit).await
}

/// Print the audit trail of one order.
pub async fn run_audit(config: WoomConfig, order_id: u64, json: bool) -> Result<(), WoomError> {
    let audit = SqliteAuditLog::open(&config.storage.database_path).await?;
    let records = audit.records_for_order(OrderId(order_id)).await?;

    if json {
        println!("{}", to_json(&records)?);
    } else if records.is_empty() {
        println!("no audit records for order {order_id}");
    } else {
        for record in &records {
            println!("{}", format_record(record));
        }
    }

    audit.close().await
}

/// Report whether the configuration is complete enough to serve.
pub fn run_check_config(config: &WoomConfig) -> bool {
    match woom_config::validate_for_serving(config) {
        Ok(()) => {
            println!("configuration ok");
            println!("  zoom:     {}", config.zoom.api_base_url);
            println!("  commerce: {}", config.commerce.base_url);
            println!(
                "  audit:    {}",
                if config.storage.audit_enabled {
                    config.storage.database_path.as_str()
                } else {
                    "disabled"
                }
            );
            true
        }
        Err(errors) => {
            woom_config::render_errors(&errors);
            false
        }
    }
}

fn format_record(record: &AuditRecord) -> String {
    let dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "#{id} {cron} {function} item={item} product={product} webinar={webinar}\n    token: {token} ({token_status})\n    response: {status} join_url: {join_url}",
        id = record.id,
        cron = record.cron_date.to_rfc3339(),
        function = dash(&record.calling_function),
        item = record.item_id,
        product = record.product_id,
        webinar = record.webinar_id,
        token = dash(&record.bearer_token),
        token_status = dash(&record.bearer_token_status_code),
        status = dash(&record.response_status_code),
        join_url = dash(&record.join_url),
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, WoomError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| WoomError::Internal(format!("failed to serialize output: {e}")))
}

async fn close_audit(audit: Option<Arc<SqliteAuditLog>>) -> Result<(), WoomError> {
    match audit.map(Arc::try_unwrap) {
        Some(Ok(audit)) => audit.close().await,
        _ => Ok(()),
    }
}
