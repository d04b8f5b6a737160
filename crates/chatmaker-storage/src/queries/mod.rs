// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod messages;
pub mod subscriptions;
pub mod suggestions;
pub mod users;

use rusqlite::{Connection, Params, Row};

/// Run a SELECT and collect every mapped row.
pub(crate) fn query_all<T, P>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>>
where
    P: Params,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    rows.collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::{tempdir, TempDir};

    use crate::database::Database;

    pub async fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open_path(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }
}
