// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit record queries.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row, params};
use woom_core::{AuditRecord, AuditUpdate, ItemId, NewAuditRecord, OrderId, ProductId, UserId, WoomError};

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, user_id, order_id, item_id, product_id, webinar_id, cron_date,
     calling_function, request_data, response_data, request_headers, bearer_token,
     bearer_token_status_code, response_status_code, join_url";

/// Insert a new record and return its id.
pub async fn insert(db: &Database, record: &NewAuditRecord) -> Result<i64, WoomError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO audit_log
                     (user_id, order_id, item_id, product_id, webinar_id, cron_date, calling_function)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.user_id.0,
                    record.order_id.0,
                    record.item_id.0,
                    record.product_id.0,
                    record.webinar_id,
                    record.cron_date.to_rfc3339_opts(SecondsFormat::Secs, true),
                    record.calling_function,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the fields set in `update`, leaving the others as they are.
pub async fn amend(db: &Database, id: i64, update: &AuditUpdate) -> Result<(), WoomError> {
    if update.is_empty() {
        return Ok(());
    }
    let update = update.clone();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE audit_log SET
                     request_data = COALESCE(?1, request_data),
                     response_data = COALESCE(?2, response_data),
                     request_headers = COALESCE(?3, request_headers),
                     bearer_token = COALESCE(?4, bearer_token),
                     bearer_token_status_code = COALESCE(?5, bearer_token_status_code),
                     response_status_code = COALESCE(?6, response_status_code),
                     join_url = COALESCE(?7, join_url)
                 WHERE id = ?8",
                params![
                    update.request_data,
                    update.response_data,
                    update.request_headers,
                    update.bearer_token,
                    update.bearer_token_status_code,
                    update.response_status_code,
                    update.join_url,
                    id,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if changed == 0 {
        return Err(WoomError::Storage {
            source: format!("audit record {id} does not exist").into(),
        });
    }
    Ok(())
}

/// All records for an order, oldest first.
pub async fn records_for_order(
    db: &Database,
    order_id: OrderId,
) -> Result<Vec<AuditRecord>, WoomError> {
    db.connection()
        .call(move |conn| -> Result<Vec<AuditRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM audit_log WHERE order_id = ?1 ORDER BY id ASC"
            ))?;
            let records = stmt
                .query_map(params![order_id.0], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single record by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<AuditRecord>, WoomError> {
    db.connection()
        .call(move |conn| -> Result<Option<AuditRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM audit_log WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    let cron_date: String = row.get(6)?;
    let cron_date = DateTime::parse_from_rfc3339(&cron_date)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(AuditRecord {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        order_id: OrderId(row.get(2)?),
        item_id: ItemId(row.get(3)?),
        product_id: ProductId(row.get(4)?),
        webinar_id: row.get(5)?,
        cron_date,
        calling_function: row.get(7)?,
        request_data: row.get(8)?,
        response_data: row.get(9)?,
        request_headers: row.get(10)?,
        bearer_token: row.get(11)?,
        bearer_token_status_code: row.get(12)?,
        response_status_code: row.get(13)?,
        join_url: row.get(14)?,
    })
}
