// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`AuditLog`] trait.

use std::path::Path;

use async_trait::async_trait;
use woom_core::{AuditLog, AuditRecord, AuditUpdate, NewAuditRecord, OrderId, WoomError};

use crate::database::Database;
use crate::queries::audit;

/// Audit log backed by the `audit_log` table.
pub struct SqliteAuditLog {
    db: Database,
}

impl SqliteAuditLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, WoomError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn close(self) -> Result<(), WoomError> {
        self.db.close().await
    }
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn insert(&self, record: &NewAuditRecord) -> Result<i64, WoomError> {
        audit::insert(&self.db, record).await
    }

    async fn amend(&self, id: i64, update: &AuditUpdate) -> Result<(), WoomError> {
        audit::amend(&self.db, id, update).await
    }

    async fn records_for_order(&self, order_id: OrderId) -> Result<Vec<AuditRecord>, WoomError> {
        audit::records_for_order(&self.db, order_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use woom_core::{ItemId, ProductId, UserId};

    use super::*;

    fn new_record(order: u64, item: u64) -> NewAuditRecord {
        NewAuditRecord {
            user_id: UserId(7),
            order_id: OrderId(order),
            item_id: ItemId(item),
            product_id: ProductId(99),
            webinar_id: "81234567890".into(),
            cron_date: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
            calling_function: "process_task".into(),
        }
    }

    async fn open_temp() -> (tempfile::TempDir, SqliteAuditLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = SqliteAuditLog::open(dir.path().join("nested").join("audit.db"))
            .await
            .unwrap();
        (dir, log)
    }

    #[tokio::test]
    async fn insert_then_read_back() {
        let (_dir, log) = open_temp().await;
        let id = log.insert(&new_record(1, 2)).await.unwrap();

        let records = log.records_for_order(OrderId(1)).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.item_id, ItemId(2));
        assert_eq!(record.webinar_id, "81234567890");
        assert_eq!(record.cron_date, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
        assert_eq!(record.calling_function.as_deref(), Some("process_task"));
        assert!(record.join_url.is_none());
    }

    #[tokio::test]
    async fn amend_only_touches_given_fields() {
        let (_dir, log) = open_temp().await;
        let id = log.insert(&new_record(1, 2)).await.unwrap();

        log.amend(
            id,
            &AuditUpdate::default()
                .bearer_token("Token Not Found in Cache")
                .bearer_token_status_code(200),
        )
        .await
        .unwrap();
        log.amend(
            id,
            &AuditUpdate::default()
                .response_status_code(201)
                .join_url("https://zoom.test/j/1"),
        )
        .await
        .unwrap();

        let record = audit::get(log.database(), id).await.unwrap().unwrap();
        assert_eq!(record.bearer_token.as_deref(), Some("Token Not Found in Cache"));
        assert_eq!(record.bearer_token_status_code.as_deref(), Some("200"));
        assert_eq!(record.response_status_code.as_deref(), Some("201"));
        assert_eq!(record.join_url.as_deref(), Some("https://zoom.test/j/1"));
        assert!(record.request_headers.is_none());
    }

    #[tokio::test]
    async fn amend_unknown_id_fails() {
        let (_dir, log) = open_temp().await;
        let err = log
            .amend(42, &AuditUpdate::default().join_url("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, WoomError::Storage { .. }));
    }

    #[tokio::test]
    async fn records_are_scoped_to_order_and_ordered() {
        let (_dir, log) = open_temp().await;
        let first = log.insert(&new_record(1, 2)).await.unwrap();
        log.insert(&new_record(5, 2)).await.unwrap();
        let second = log.insert(&new_record(1, 3)).await.unwrap();

        let ids: Vec<i64> = log
            .records_for_order(OrderId(1))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.db");

        let log = SqliteAuditLog::open(&path).await.unwrap();
        log.insert(&new_record(1, 2)).await.unwrap();
        log.close().await.unwrap();

        let log = SqliteAuditLog::open(&path).await.unwrap();
        assert_eq!(log.records_for_order(OrderId(1)).await.unwrap().len(), 1);
    }
}
