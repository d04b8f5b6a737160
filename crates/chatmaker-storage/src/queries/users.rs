// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use chatmaker_core::{check_timestamp, ChatMakerError, User};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{get_time, missing_id, record_not_found, to_sql_time, Database};
use crate::queries::query_all;

const INSERT: &str = "INSERT INTO users (email, name, microsoft_id, is_active, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_BY_ID: &str = "SELECT id, email, name, microsoft_id, is_active, created_at, updated_at
     FROM users WHERE id = ?1";
const SELECT_BY_EMAIL: &str = "SELECT id, email, name, microsoft_id, is_active, created_at, updated_at
     FROM users WHERE email = ?1";
const SELECT_BY_MICROSOFT_ID: &str = "SELECT id, email, name, microsoft_id, is_active, created_at, updated_at
     FROM users WHERE microsoft_id = ?1";
const SELECT_ALL: &str = "SELECT id, email, name, microsoft_id, is_active, created_at, updated_at
     FROM users ORDER BY id";
const UPDATE: &str = "UPDATE users SET email = ?1, name = ?2, microsoft_id = ?3, is_active = ?4, updated_at = ?5
     WHERE id = ?6";
const DELETE: &str = "DELETE FROM users WHERE id = ?1";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        microsoft_id: row.get(3)?,
        is_active: row.get(4)?,
        created_at: get_time(row, 5)?,
        updated_at: get_time(row, 6)?,
    })
}

fn check_user(user: &User) -> Result<(), ChatMakerError> {
    if user.email.trim().is_empty() {
        return Err(ChatMakerError::validation("user email is required").with_code("MISSING_EMAIL"));
    }
    check_timestamp("created_at", &user.created_at)?;
    check_timestamp("updated_at", &user.updated_at)
}

/// Insert a user and return the stored row.
pub async fn create_user(db: &Database, user: &User) -> Result<User, ChatMakerError> {
    check_user(user)?;
    let user = user.clone();
    db.call(INSERT, move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            INSERT,
            params![
                user.email,
                user.name,
                user.microsoft_id,
                user.is_active,
                to_sql_time(&user.created_at),
                to_sql_time(&user.updated_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_user)?;
        tx.commit()?;
        Ok(stored)
    })
    .await
}

pub async fn get_user(db: &Database, id: i64) -> Result<Option<User>, ChatMakerError> {
    db.call(SELECT_BY_ID, move |conn| {
        conn.query_row(SELECT_BY_ID, params![id], row_to_user)
            .optional()
    })
    .await
}

pub async fn get_user_by_email(db: &Database, email: &str) -> Result<Option<User>, ChatMakerError> {
    let email = email.to_string();
    db.call(SELECT_BY_EMAIL, move |conn| {
        conn.query_row(SELECT_BY_EMAIL, params![email], row_to_user)
            .optional()
    })
    .await
}

pub async fn get_user_by_microsoft_id(
    db: &Database,
    microsoft_id: &str,
) -> Result<Option<User>, ChatMakerError> {
    let microsoft_id = microsoft_id.to_string();
    db.call(SELECT_BY_MICROSOFT_ID, move |conn| {
        conn.query_row(SELECT_BY_MICROSOFT_ID, params![microsoft_id], row_to_user)
            .optional()
    })
    .await
}

/// Persist every mutable field and stamp `updated_at`.
pub async fn update_user(db: &Database, user: &User) -> Result<User, ChatMakerError> {
    let id = user.id.ok_or_else(|| missing_id("users"))?;
    check_user(user)?;
    let user = user.clone();
    let updated_at = to_sql_time(&Utc::now());
    let stored = db
        .call(UPDATE, move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                UPDATE,
                params![
                    user.email,
                    user.name,
                    user.microsoft_id,
                    user.is_active,
                    updated_at,
                    id
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_user)?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await?;
    stored.ok_or_else(|| record_not_found("users", id))
}

/// Delete a user. Returns `false` when no row had the id.
pub async fn delete_user(db: &Database, id: i64) -> Result<bool, ChatMakerError> {
    db.call(DELETE, move |conn| conn.execute(DELETE, params![id]))
        .await
        .map(|deleted| deleted > 0)
}

pub async fn list_users(db: &Database) -> Result<Vec<User>, ChatMakerError> {
    db.call(SELECT_ALL, |conn| query_all(conn, SELECT_ALL, [], row_to_user))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use chatmaker_core::ErrorKind;

    fn make_user(email: &str) -> User {
        User::new(email, "Alice").unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_and_roundtrips() {
        let (db, _dir) = setup_db().await;
        let mut user = make_user("alice@example.com");
        user.id = Some(999);

        let stored = create_user(&db, &user).await.unwrap();
        assert_eq!(stored.id, Some(1));
        assert_eq!(stored.email, "alice@example.com");
        assert_eq!(stored.created_at, user.created_at);

        let fetched = get_user(&db, 1).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn lookups_by_email_and_microsoft_id() {
        let (db, _dir) = setup_db().await;
        let user = make_user("bob@example.com").with_microsoft_id("ms-42");
        create_user(&db, &user).await.unwrap();

        let by_email = get_user_by_email(&db, "bob@example.com").await.unwrap();
        assert!(by_email.is_some());
        let by_ms = get_user_by_microsoft_id(&db, "ms-42").await.unwrap();
        assert_eq!(by_ms.unwrap().email, "bob@example.com");
        assert!(get_user_by_email(&db, "nobody@example.com")
            .await
            .unwrap()
            .is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("dup@example.com")).await.unwrap();
        let err = create_user(&db, &make_user("dup@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Database);
        assert_eq!(err.code(), Some("DUPLICATE_RECORD"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn users_without_microsoft_id_do_not_collide() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("a@example.com")).await.unwrap();
        create_user(&db, &make_user("b@example.com")).await.unwrap();
        assert_eq!(list_users(&db).await.unwrap().len(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_persists_fields() {
        let (db, _dir) = setup_db().await;
        let mut stored = create_user(&db, &make_user("c@example.com")).await.unwrap();
        stored.name = "Carol".to_string();
        stored.is_active = false;

        let updated = update_user(&db, &stored).await.unwrap();
        assert_eq!(updated.name, "Carol");
        assert!(!updated.is_active);
        assert!(updated.updated_at >= stored.updated_at);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_without_id_is_a_validation_error() {
        let (db, _dir) = setup_db().await;
        let err = update_user(&db, &make_user("d@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), Some("MISSING_ID"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (db, _dir) = setup_db().await;
        let mut user = make_user("e@example.com");
        user.id = Some(77);
        let err = update_user(&db, &user).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Database);
        assert_eq!(err.code(), Some("RECORD_NOT_FOUND"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let (db, _dir) = setup_db().await;
        let stored = create_user(&db, &make_user("f@example.com")).await.unwrap();
        let id = stored.id.unwrap();
        assert!(delete_user(&db, id).await.unwrap());
        assert!(!delete_user(&db, id).await.unwrap());
        assert!(get_user(&db, id).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let (db, _dir) = setup_db().await;
        for email in ["z@example.com", "a@example.com", "m@example.com"] {
            create_user(&db, &make_user(email)).await.unwrap();
        }
        let ids: Vec<i64> = list_users(&db)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        db.close().await.unwrap();
    }
}
