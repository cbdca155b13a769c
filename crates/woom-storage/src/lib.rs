// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite audit log for the Woom registration service.
//!
//! WAL-mode SQLite with embedded migrations, accessed through a single
//! `tokio-rusqlite` connection.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteAuditLog;
pub use database::Database;
