// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message CRUD operations.
//!
//! Listings are ordered by `sent_at`, ties broken by id.

use chatmaker_core::{check_timestamp, ChatMakerError, ChatMessage};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::{Map, Value};

use crate::database::{
    get_opt_time, get_time, missing_id, record_not_found, to_sql_time, Database,
};
use crate::queries::query_all;

const INSERT: &str = "INSERT INTO chat_messages
     (message_id, chat_id, thread_id, content, sender_id, sender_name, message_type,
      sent_at, processed_at, is_processed, metadata, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";
const SELECT_BY_ID: &str = "SELECT id, message_id, chat_id, thread_id, content, sender_id, sender_name,
     message_type, sent_at, processed_at, is_processed, metadata, created_at, updated_at
     FROM chat_messages WHERE id = ?1";
const SELECT_BY_MESSAGE_ID: &str = "SELECT id, message_id, chat_id, thread_id, content, sender_id, sender_name,
     message_type, sent_at, processed_at, is_processed, metadata, created_at, updated_at
     FROM chat_messages WHERE message_id = ?1";
const SELECT_UNPROCESSED: &str = "SELECT id, message_id, chat_id, thread_id, content, sender_id, sender_name,
     message_type, sent_at, processed_at, is_processed, metadata, created_at, updated_at
     FROM chat_messages WHERE is_processed = 0 ORDER BY sent_at, id";
const SELECT_BY_CHAT: &str = "SELECT id, message_id, chat_id, thread_id, content, sender_id, sender_name,
     message_type, sent_at, processed_at, is_processed, metadata, created_at, updated_at
     FROM chat_messages WHERE chat_id = ?1 ORDER BY sent_at, id";
const UPDATE: &str = "UPDATE chat_messages SET
     message_id = ?1, chat_id = ?2, thread_id = ?3, content = ?4, sender_id = ?5,
     sender_name = ?6, message_type = ?7, sent_at = ?8, processed_at = ?9,
     is_processed = ?10, metadata = ?11, updated_at = ?12
     WHERE id = ?13";
const DELETE: &str = "DELETE FROM chat_messages WHERE id = ?1";

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let metadata: String = row.get(11)?;
    let metadata: Map<String, Value> = serde_json::from_str(&metadata)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;
    Ok(ChatMessage {
        id: Some(row.get(0)?),
        message_id: row.get(1)?,
        chat_id: row.get(2)?,
        thread_id: row.get(3)?,
        content: row.get(4)?,
        sender_id: row.get(5)?,
        sender_name: row.get(6)?,
        message_type: row.get(7)?,
        sent_at: get_time(row, 8)?,
        processed_at: get_opt_time(row, 9)?,
        is_processed: row.get(10)?,
        metadata,
        created_at: get_time(row, 12)?,
        updated_at: get_time(row, 13)?,
    })
}

fn encode_metadata(message: &ChatMessage) -> Result<String, ChatMakerError> {
    serde_json::to_string(&message.metadata).map_err(|e| {
        ChatMakerError::database("failed to encode message metadata").with_source(e)
    })
}

fn check_times(message: &ChatMessage) -> Result<(), ChatMakerError> {
    check_timestamp("sent_at", &message.sent_at)?;
    if let Some(processed_at) = &message.processed_at {
        check_timestamp("processed_at", processed_at)?;
    }
    check_timestamp("created_at", &message.created_at)?;
    check_timestamp("updated_at", &message.updated_at)
}

/// Insert a message and return the stored row.
pub async fn create_message(
    db: &Database,
    message: &ChatMessage,
) -> Result<ChatMessage, ChatMakerError> {
    check_times(message)?;
    let metadata = encode_metadata(message)?;
    let m = message.clone();
    db.call(INSERT, move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            INSERT,
            params![
                m.message_id,
                m.chat_id,
                m.thread_id,
                m.content,
                m.sender_id,
                m.sender_name,
                m.message_type,
                to_sql_time(&m.sent_at),
                m.processed_at.as_ref().map(to_sql_time),
                m.is_processed,
                metadata,
                to_sql_time(&m.created_at),
                to_sql_time(&m.updated_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_message)?;
        tx.commit()?;
        Ok(stored)
    })
    .await
}

pub async fn get_message(db: &Database, id: i64) -> Result<Option<ChatMessage>, ChatMakerError> {
    db.call(SELECT_BY_ID, move |conn| {
        conn.query_row(SELECT_BY_ID, params![id], row_to_message)
            .optional()
    })
    .await
}

/// Look up a message by its Teams message id.
pub async fn get_message_by_message_id(
    db: &Database,
    message_id: &str,
) -> Result<Option<ChatMessage>, ChatMakerError> {
    let message_id = message_id.to_string();
    db.call(SELECT_BY_MESSAGE_ID, move |conn| {
        conn.query_row(SELECT_BY_MESSAGE_ID, params![message_id], row_to_message)
            .optional()
    })
    .await
}

/// Persist every mutable field and stamp `updated_at`.
pub async fn update_message(
    db: &Database,
    message: &ChatMessage,
) -> Result<ChatMessage, ChatMakerError> {
    let id = message.id.ok_or_else(|| missing_id("chat_messages"))?;
    check_times(message)?;
    let metadata = encode_metadata(message)?;
    let m = message.clone();
    let updated_at = to_sql_time(&Utc::now());
    let stored = db
        .call(UPDATE, move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                UPDATE,
                params![
                    m.message_id,
                    m.chat_id,
                    m.thread_id,
                    m.content,
                    m.sender_id,
                    m.sender_name,
                    m.message_type,
                    to_sql_time(&m.sent_at),
                    m.processed_at.as_ref().map(to_sql_time),
                    m.is_processed,
                    metadata,
                    updated_at,
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_message)?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await?;
    stored.ok_or_else(|| record_not_found("chat_messages", id))
}

pub async fn delete_message(db: &Database, id: i64) -> Result<bool, ChatMakerError> {
    db.call(DELETE, move |conn| conn.execute(DELETE, params![id]))
        .await
        .map(|deleted| deleted > 0)
}

pub async fn list_unprocessed(db: &Database) -> Result<Vec<ChatMessage>, ChatMakerError> {
    db.call(SELECT_UNPROCESSED, |conn| {
        query_all(conn, SELECT_UNPROCESSED, [], row_to_message)
    })
    .await
}

pub async fn list_by_chat_id(
    db: &Database,
    chat_id: &str,
) -> Result<Vec<ChatMessage>, ChatMakerError> {
    let chat_id = chat_id.to_string();
    db.call(SELECT_BY_CHAT, move |conn| {
        query_all(conn, SELECT_BY_CHAT, params![chat_id], row_to_message)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use chatmaker_core::ErrorKind;
    use chrono::{DateTime, Duration, TimeZone};
    use serde_json::json;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_message(message_id: &str, chat_id: &str, offset_secs: i64) -> ChatMessage {
        ChatMessage::new(
            message_id,
            chat_id,
            format!("content of {message_id}"),
            "u-1",
            "Alice",
            base_time() + Duration::seconds(offset_secs),
        )
    }

    #[tokio::test]
    async fn create_and_get_roundtrips_metadata() {
        let (db, _dir) = setup_db().await;
        let mut msg = make_message("m-1", "chat-1", 0);
        msg.thread_id = Some("thread-9".to_string());
        msg.metadata.insert("importance".to_string(), json!("high"));
        msg.metadata.insert("mentions".to_string(), json!(["bob"]));

        let stored = create_message(&db, &msg).await.unwrap();
        assert!(stored.id.is_some());
        assert_eq!(stored.metadata, msg.metadata);
        assert_eq!(stored.thread_id.as_deref(), Some("thread-9"));
        assert_eq!(stored.sent_at, msg.sent_at);

        let by_external = get_message_by_message_id(&db, "m-1").await.unwrap();
        assert_eq!(by_external, Some(stored));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_message_id_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_message(&db, &make_message("m-dup", "chat-1", 0))
            .await
            .unwrap();
        let err = create_message(&db, &make_message("m-dup", "chat-2", 5))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("DUPLICATE_RECORD"));
        assert_eq!(err.message(), "duplicate record");
        assert!(!err.to_string().contains("UNIQUE constraint"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn five_digit_year_is_rejected_before_writing() {
        let (db, _dir) = setup_db().await;
        create_message(&db, &make_message("ok", "chat-1", 0)).await.unwrap();

        let mut far = make_message("far", "chat-1", 0);
        far.sent_at = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        let err = create_message(&db, &far).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), Some("INVALID_TIMESTAMP"));
        assert_eq!(err.details()["field"], "sent_at");

        // Nothing half-written: listings still decode.
        let ids: Vec<String> = list_by_chat_id(&db, "chat-1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec!["ok"]);
        assert!(get_message_by_message_id(&db, "far").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_with_five_digit_processed_at_keeps_the_stored_row() {
        let (db, _dir) = setup_db().await;
        let mut stored = create_message(&db, &make_message("m-1", "chat-1", 0))
            .await
            .unwrap();
        stored.is_processed = true;
        stored.processed_at = Some(Utc.with_ymd_and_hms(12_345, 6, 1, 0, 0, 0).unwrap());
        let err = update_message(&db, &stored).await.unwrap_err();
        assert_eq!(err.code(), Some("INVALID_TIMESTAMP"));

        let reloaded = get_message(&db, stored.id.unwrap()).await.unwrap().unwrap();
        assert!(!reloaded.is_processed);
        assert_eq!(list_unprocessed(&db).await.unwrap().len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unprocessed_listing_follows_sent_at() {
        let (db, _dir) = setup_db().await;
        create_message(&db, &make_message("late", "chat-1", 60))
            .await
            .unwrap();
        create_message(&db, &make_message("early", "chat-1", 0))
            .await
            .unwrap();
        let mut done = make_message("done", "chat-1", 30);
        done.mark_as_processed();
        create_message(&db, &done).await.unwrap();

        let ids: Vec<String> = list_unprocessed(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_sent_at_breaks_ties_by_id() {
        let (db, _dir) = setup_db().await;
        create_message(&db, &make_message("b", "chat-1", 0)).await.unwrap();
        create_message(&db, &make_message("a", "chat-1", 0)).await.unwrap();
        let ids: Vec<String> = list_by_chat_id(&db, "chat-1")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_chat_filters_other_chats() {
        let (db, _dir) = setup_db().await;
        create_message(&db, &make_message("m-1", "chat-1", 0)).await.unwrap();
        create_message(&db, &make_message("m-2", "chat-2", 0)).await.unwrap();
        let chat_two = list_by_chat_id(&db, "chat-2").await.unwrap();
        assert_eq!(chat_two.len(), 1);
        assert_eq!(chat_two[0].message_id, "m-2");
        assert_eq!(list_by_chat_id(&db, "chat-1").await.unwrap().len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_marks_processed() {
        let (db, _dir) = setup_db().await;
        let mut stored = create_message(&db, &make_message("m-1", "chat-1", 0))
            .await
            .unwrap();
        stored.mark_as_processed();
        let updated = update_message(&db, &stored).await.unwrap();
        assert!(updated.is_processed);
        assert_eq!(updated.processed_at, stored.processed_at);
        assert!(list_unprocessed(&db).await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_errors() {
        let (db, _dir) = setup_db().await;
        let mut msg = make_message("m-1", "chat-1", 0);
        let err = update_message(&db, &msg).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), Some("MISSING_ID"));

        msg.id = Some(12);
        let err = update_message(&db, &msg).await.unwrap_err();
        assert_eq!(err.code(), Some("RECORD_NOT_FOUND"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let (db, _dir) = setup_db().await;
        assert!(!delete_message(&db, 1).await.unwrap());
        let stored = create_message(&db, &make_message("m-1", "chat-1", 0))
            .await
            .unwrap();
        assert!(delete_message(&db, stored.id.unwrap()).await.unwrap());
        db.close().await.unwrap();
    }
}
