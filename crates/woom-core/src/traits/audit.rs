// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit log capability.

use async_trait::async_trait;

use crate::error::WoomError;
use crate::types::{AuditRecord, AuditUpdate, NewAuditRecord, OrderId};

/// Append-per-attempt audit trail, amended in place while an attempt runs.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Inserts a record and returns its id.
    async fn insert(&self, record: &NewAuditRecord) -> Result<i64, WoomError>;

    /// Applies the non-empty fields of `update` to record `id`.
    async fn amend(&self, id: i64, update: &AuditUpdate) -> Result<(), WoomError>;

    /// All records for an order, oldest first.
    async fn records_for_order(&self, order_id: OrderId) -> Result<Vec<AuditRecord>, WoomError>;
}
