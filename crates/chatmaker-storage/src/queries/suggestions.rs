// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply suggestion CRUD operations.
//!
//! Rows that are sent without being selected are rejected before they reach
//! SQLite; the table carries the same CHECK constraint.

use chatmaker_core::{check_timestamp, ChatMakerError, ReplySuggestion};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{
    get_opt_time, get_time, missing_id, record_not_found, to_sql_time, Database,
};
use crate::queries::query_all;

const INSERT: &str = "INSERT INTO reply_suggestions
     (message_id, content, confidence_score, is_selected, is_sent, sent_at, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const SELECT_BY_ID: &str = "SELECT id, message_id, content, confidence_score, is_selected, is_sent,
     sent_at, created_at, updated_at FROM reply_suggestions WHERE id = ?1";
const SELECT_BY_MESSAGE_ID: &str = "SELECT id, message_id, content, confidence_score, is_selected, is_sent,
     sent_at, created_at, updated_at FROM reply_suggestions WHERE message_id = ?1 ORDER BY id";
const SELECT_SELECTED: &str = "SELECT id, message_id, content, confidence_score, is_selected, is_sent,
     sent_at, created_at, updated_at FROM reply_suggestions WHERE is_selected = 1 ORDER BY id";
const SELECT_SENT: &str = "SELECT id, message_id, content, confidence_score, is_selected, is_sent,
     sent_at, created_at, updated_at FROM reply_suggestions WHERE is_sent = 1 ORDER BY id";
const COUNT_BY_MESSAGE_ID: &str = "SELECT COUNT(*) FROM reply_suggestions WHERE message_id = ?1";
const UPDATE: &str = "UPDATE reply_suggestions SET
     message_id = ?1, content = ?2, confidence_score = ?3, is_selected = ?4, is_sent = ?5,
     sent_at = ?6, updated_at = ?7
     WHERE id = ?8";
const DELETE: &str = "DELETE FROM reply_suggestions WHERE id = ?1";

fn row_to_suggestion(row: &Row<'_>) -> rusqlite::Result<ReplySuggestion> {
    Ok(ReplySuggestion {
        id: Some(row.get(0)?),
        message_id: row.get(1)?,
        content: row.get(2)?,
        confidence_score: row.get(3)?,
        is_selected: row.get(4)?,
        is_sent: row.get(5)?,
        sent_at: get_opt_time(row, 6)?,
        created_at: get_time(row, 7)?,
        updated_at: get_time(row, 8)?,
    })
}

fn check_times(suggestion: &ReplySuggestion) -> Result<(), ChatMakerError> {
    if let Some(sent_at) = &suggestion.sent_at {
        check_timestamp("sent_at", sent_at)?;
    }
    check_timestamp("created_at", &suggestion.created_at)?;
    check_timestamp("updated_at", &suggestion.updated_at)
}

pub async fn create_suggestion(
    db: &Database,
    suggestion: &ReplySuggestion,
) -> Result<ReplySuggestion, ChatMakerError> {
    suggestion.validate()?;
    check_times(suggestion)?;
    let s = suggestion.clone();
    db.call(INSERT, move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            INSERT,
            params![
                s.message_id,
                s.content,
                s.confidence_score,
                s.is_selected,
                s.is_sent,
                s.sent_at.as_ref().map(to_sql_time),
                to_sql_time(&s.created_at),
                to_sql_time(&s.updated_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_suggestion)?;
        tx.commit()?;
        Ok(stored)
    })
    .await
}

pub async fn get_suggestion(
    db: &Database,
    id: i64,
) -> Result<Option<ReplySuggestion>, ChatMakerError> {
    db.call(SELECT_BY_ID, move |conn| {
        conn.query_row(SELECT_BY_ID, params![id], row_to_suggestion)
            .optional()
    })
    .await
}

/// All suggestions for one message, oldest first.
pub async fn list_by_message_id(
    db: &Database,
    message_id: &str,
) -> Result<Vec<ReplySuggestion>, ChatMakerError> {
    let message_id = message_id.to_string();
    db.call(SELECT_BY_MESSAGE_ID, move |conn| {
        query_all(conn, SELECT_BY_MESSAGE_ID, params![message_id], row_to_suggestion)
    })
    .await
}

pub async fn count_by_message_id(db: &Database, message_id: &str) -> Result<u64, ChatMakerError> {
    let message_id = message_id.to_string();
    let count = db
        .call(COUNT_BY_MESSAGE_ID, move |conn| {
            conn.query_row(COUNT_BY_MESSAGE_ID, params![message_id], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await?;
    Ok(count.max(0) as u64)
}

pub async fn update_suggestion(
    db: &Database,
    suggestion: &ReplySuggestion,
) -> Result<ReplySuggestion, ChatMakerError> {
    let id = suggestion.id.ok_or_else(|| missing_id("reply_suggestions"))?;
    suggestion.validate()?;
    check_times(suggestion)?;
    let s = suggestion.clone();
    let updated_at = to_sql_time(&Utc::now());
    let stored = db
        .call(UPDATE, move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                UPDATE,
                params![
                    s.message_id,
                    s.content,
                    s.confidence_score,
                    s.is_selected,
                    s.is_sent,
                    s.sent_at.as_ref().map(to_sql_time),
                    updated_at,
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_suggestion)?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await?;
    stored.ok_or_else(|| record_not_found("reply_suggestions", id))
}

pub async fn delete_suggestion(db: &Database, id: i64) -> Result<bool, ChatMakerError> {
    db.call(DELETE, move |conn| conn.execute(DELETE, params![id]))
        .await
        .map(|deleted| deleted > 0)
}

pub async fn list_selected(db: &Database) -> Result<Vec<ReplySuggestion>, ChatMakerError> {
    db.call(SELECT_SELECTED, |conn| {
        query_all(conn, SELECT_SELECTED, [], row_to_suggestion)
    })
    .await
}

pub async fn list_sent(db: &Database) -> Result<Vec<ReplySuggestion>, ChatMakerError> {
    db.call(SELECT_SENT, |conn| query_all(conn, SELECT_SENT, [], row_to_suggestion))
        .await
}
