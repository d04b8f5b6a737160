// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use chatmaker_config::model::{DatabaseConfig, SqliteLocation};
use chatmaker_core::ChatMakerError;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::ffi;
use rusqlite::types::Type;
use tracing::{debug, info, warn};

use crate::migrations::run_migrations;

/// Handle to the application database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    echo: bool,
}

impl Database {
    /// Open the database named by `config.url` and apply pending migrations.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, ChatMakerError> {
        let location = config.sqlite_location().ok_or_else(|| {
            ChatMakerError::configuration(format!(
                "unsupported database url `{}`",
                config.url
            ))
            .with_code("UNSUPPORTED_DATABASE_URL")
        })?;

        let conn = match &location {
            SqliteLocation::Memory => tokio_rusqlite::Connection::open_in_memory().await,
            SqliteLocation::File(path) => tokio_rusqlite::Connection::open(path).await,
        }
        .map_err(map_sql_err)?;

        // WAL is meaningless for a private in-memory database.
        let wal_mode = config.wal_mode && location != SqliteLocation::Memory;
        let db = Self::init(conn, wal_mode, config.echo).await?;
        info!(location = ?location, wal_mode, "database opened");
        Ok(db)
    }

    /// Open (or create) a database file with WAL mode enabled.
    pub async fn open_path(path: &str) -> Result<Self, ChatMakerError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sql_err)?;
        Self::init(conn, true, false).await
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, ChatMakerError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_sql_err)?;
        Self::init(conn, false, false).await
    }

    async fn init(
        conn: tokio_rusqlite::Connection,
        wal_mode: bool,
        echo: bool,
    ) -> Result<Self, ChatMakerError> {
        conn.call(move |conn| -> Result<(), ChatMakerError> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
                    .map_err(map_sql_err)?;
            }
            conn.execute_batch("PRAGMA foreign_keys=ON;")
                .map_err(map_sql_err)?;
            conn.busy_timeout(Duration::from_secs(5))
                .map_err(map_sql_err)?;
            run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(e) => e,
            other => ChatMakerError::database(format!("database setup failed: {other}")),
        })?;

        Ok(Self { conn, echo })
    }

    /// Run `statement` on the connection thread.
    ///
    /// `sql` is logged at debug level when `database.echo` is enabled.
    pub async fn call<R, F>(&self, sql: &'static str, statement: F) -> Result<R, ChatMakerError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        if self.echo {
            debug!(target: "chatmaker_storage::sql", sql, "executing statement");
        }
        self.conn.call(statement).await.map_err(map_tr_err)
    }

    /// Liveness probe: `SELECT 1`.
    pub async fn ping(&self) -> Result<(), ChatMakerError> {
        self.call("SELECT 1", |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), ChatMakerError> {
        self.call("PRAGMA wal_checkpoint(TRUNCATE)", |conn| {
            // Returns a row; a no-op outside WAL mode.
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
        })
        .await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ChatMakerError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

/// Map a tokio-rusqlite failure into the error taxonomy.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatMakerError {
    match e {
        tokio_rusqlite::Error::Error(e) => map_sql_err(e),
        tokio_rusqlite::Error::Close((_, e)) => map_sql_err(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            ChatMakerError::database("database connection is closed")
                .with_code("CONNECTION_CLOSED")
        }
        other => {
            warn!(error = %other, "sqlite connection call failed");
            ChatMakerError::database("database error")
        }
    }
}

/// Map a rusqlite failure; unique violations become `DUPLICATE_RECORD`.
pub(crate) fn map_sql_err(e: rusqlite::Error) -> ChatMakerError {
    let unique_violation = matches!(
        &e,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    );
    // SQLite text names tables and columns; it stays in the log and the source chain.
    warn!(error = %e, "sqlite statement failed");
    if unique_violation {
        ChatMakerError::database("duplicate record")
            .with_code("DUPLICATE_RECORD")
            .with_source(e)
    } else {
        ChatMakerError::database("database error").with_source(e)
    }
}

/// Error for an update aimed at an id with no row.
pub(crate) fn record_not_found(table: &str, id: i64) -> ChatMakerError {
    ChatMakerError::database(format!("{table} record {id} not found"))
        .with_code("RECORD_NOT_FOUND")
        .with_detail("table", table)
        .with_detail("id", id)
}

/// Error for an update of a record that was never stored.
pub(crate) fn missing_id(table: &str) -> ChatMakerError {
    ChatMakerError::validation(format!("cannot update {table} record without an id"))
        .with_code("MISSING_ID")
        .with_detail("table", table)
}

/// Fixed-width RFC 3339 form used for every stored timestamp.
pub(crate) fn to_sql_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse the timestamp stored in column `idx`.
pub(crate) fn from_sql_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a timestamp column.
pub(crate) fn get_time(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    from_sql_time(idx, &raw)
}

pub(crate) fn get_opt_time(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| from_sql_time(idx, &raw)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmaker_core::ErrorKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let db = Database::open_path(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .call("", |conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     AND name != 'refinery_schema_history' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(
            tables,
            vec!["chat_messages", "reply_suggestions", "subscriptions", "users"]
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_does_not_rerun_migrations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();
        Database::open_path(path).await.unwrap().close().await.unwrap();
        let db = Database::open_path(path).await.unwrap();
        db.ping().await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_from_config_url() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:///{}", dir.path().join("cfg.db").display()),
            echo: true,
            wal_mode: true,
        };
        let db = Database::open(&config).await.unwrap();
        let mode: String = db
            .call("PRAGMA journal_mode", |conn| {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_ascii_lowercase(), "wal");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_url_is_supported() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            echo: false,
            wal_mode: true,
        };
        let db = Database::open(&config).await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn non_sqlite_url_is_a_configuration_error() {
        let config = DatabaseConfig {
            url: "postgres://localhost/app".to_string(),
            echo: false,
            wal_mode: true,
        };
        let err = Database::open(&config).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.code(), Some("UNSUPPORTED_DATABASE_URL"));
    }

    #[test]
    fn stored_timestamps_sort_chronologically() {
        let early = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2026-01-01T00:00:01Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(to_sql_time(&early) < to_sql_time(&late));
        assert_eq!(from_sql_time(0, &to_sql_time(&early)).unwrap(), early);
    }

    #[test]
    fn garbage_timestamp_is_a_conversion_error() {
        assert!(matches!(
            from_sql_time(3, "yesterday"),
            Err(rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _))
        ));
    }
}
