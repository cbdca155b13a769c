// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, so
//! writes are serialized without any extra locking.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use woom_core::WoomError;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;";

/// Handle to the audit database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply pending
    /// migrations before handing out the async connection.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, WoomError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let migrate_path = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), WoomError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(storage_err)?;
            conn.execute_batch(PRAGMAS).map_err(storage_err)?;
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| WoomError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(storage_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch(PRAGMAS) })
            .await
            .map_err(map_tr_err)?;

        info!(path = %path.display(), "audit database opened");
        Ok(Self { conn, path })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), WoomError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!(path = %self.path.display(), "audit database closed");
        Ok(())
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> WoomError {
    WoomError::Storage {
        source: Box::new(e),
    }
}

/// Map a tokio-rusqlite error into [`WoomError::Storage`].
pub fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> WoomError
where
    E: std::error::Error + Send + Sync + 'static,
{
    storage_err(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_parent_dirs_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.db");

        let db = Database::open(&path).await.unwrap();
        assert_eq!(db.path(), path.as_path());
        db.close().await.unwrap();
        assert!(path.exists());

        // Reopening runs migrations against the existing file.
        let db = Database::open(&path).await.unwrap();
        db.close().await.unwrap();
    }
}
