// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort audit trail for one attempt.

use std::sync::Arc;

use tracing::warn;
use woom_core::{AuditLog, AuditUpdate, NewAuditRecord};

/// Recorded in `join_url` when the registrant endpoint answers 429.
pub const RATE_LIMIT_MESSAGE: &str =
    "Exceed a rate limit, the API request will fail and return a HTTP 429 status code";
/// Recorded in `join_url` when a response carries no join link.
pub const JOIN_URL_MISSING: &str = "Join URL Not Found in Response";
/// Recorded in `request_headers` when registration is skipped for an existing link.
pub const JOIN_URL_EXISTS: &str = "Join URL Already Exists";

pub const CALLED_FROM_CHECKOUT: &str = "schedule_order";
pub const CALLED_FROM_TASK: &str = "process_task";

/// Handle on the audit row of the running attempt.
///
/// Write failures are logged and otherwise ignored; a missing or partial
/// audit row never changes what the attempt does.
pub(crate) struct AttemptAudit {
    log: Option<Arc<dyn AuditLog>>,
    id: Option<i64>,
}

impl AttemptAudit {
    pub(crate) async fn begin(log: Option<&Arc<dyn AuditLog>>, record: NewAuditRecord) -> Self {
        let Some(log) = log else {
            return Self { log: None, id: None };
        };
        let id = match log.insert(&record).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(
                    order_id = %record.order_id,
                    item_id = %record.item_id,
                    error = %e,
                    "failed to create audit record"
                );
                None
            }
        };
        Self {
            log: Some(Arc::clone(log)),
            id,
        }
    }

    pub(crate) async fn record(&self, update: AuditUpdate) {
        let (Some(log), Some(id)) = (&self.log, self.id) else {
            return;
        };
        if let Err(e) = log.amend(id, &update).await {
            warn!(audit_id = id, error = %e, "failed to update audit record");
        }
    }
}
