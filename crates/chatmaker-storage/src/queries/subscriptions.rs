// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook subscription CRUD operations.

use chatmaker_core::{check_timestamp, ChatMakerError, Subscription};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::{get_time, missing_id, record_not_found, to_sql_time, Database};
use crate::queries::query_all;

const INSERT: &str = "INSERT INTO subscriptions
     (subscription_id, resource, change_type, client_state, notification_url,
      expiration_date_time, is_active, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const SELECT_BY_ID: &str = "SELECT id, subscription_id, resource, change_type, client_state,
     notification_url, expiration_date_time, is_active, created_at, updated_at
     FROM subscriptions WHERE id = ?1";
const SELECT_BY_SUBSCRIPTION_ID: &str = "SELECT id, subscription_id, resource, change_type, client_state,
     notification_url, expiration_date_time, is_active, created_at, updated_at
     FROM subscriptions WHERE subscription_id = ?1";
const SELECT_ACTIVE: &str = "SELECT id, subscription_id, resource, change_type, client_state,
     notification_url, expiration_date_time, is_active, created_at, updated_at
     FROM subscriptions WHERE is_active = 1 AND expiration_date_time >= ?1 ORDER BY id";
const SELECT_EXPIRED: &str = "SELECT id, subscription_id, resource, change_type, client_state,
     notification_url, expiration_date_time, is_active, created_at, updated_at
     FROM subscriptions WHERE expiration_date_time < ?1 ORDER BY id";
const UPDATE: &str = "UPDATE subscriptions SET
     subscription_id = ?1, resource = ?2, change_type = ?3, client_state = ?4,
     notification_url = ?5, expiration_date_time = ?6, is_active = ?7, updated_at = ?8
     WHERE id = ?9";
const DELETE: &str = "DELETE FROM subscriptions WHERE id = ?1";

fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: Some(row.get(0)?),
        subscription_id: row.get(1)?,
        resource: row.get(2)?,
        change_type: row.get(3)?,
        client_state: row.get(4)?,
        notification_url: row.get(5)?,
        expiration_date_time: get_time(row, 6)?,
        is_active: row.get(7)?,
        created_at: get_time(row, 8)?,
        updated_at: get_time(row, 9)?,
    })
}

fn check_times(subscription: &Subscription) -> Result<(), ChatMakerError> {
    check_timestamp("expiration_date_time", &subscription.expiration_date_time)?;
    check_timestamp("created_at", &subscription.created_at)?;
    check_timestamp("updated_at", &subscription.updated_at)
}

pub async fn create_subscription(
    db: &Database,
    subscription: &Subscription,
) -> Result<Subscription, ChatMakerError> {
    check_times(subscription)?;
    let s = subscription.clone();
    db.call(INSERT, move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            INSERT,
            params![
                s.subscription_id,
                s.resource,
                s.change_type,
                s.client_state,
                s.notification_url,
                to_sql_time(&s.expiration_date_time),
                s.is_active,
                to_sql_time(&s.created_at),
                to_sql_time(&s.updated_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_subscription)?;
        tx.commit()?;
        Ok(stored)
    })
    .await
}

pub async fn get_subscription(
    db: &Database,
    id: i64,
) -> Result<Option<Subscription>, ChatMakerError> {
    db.call(SELECT_BY_ID, move |conn| {
        conn.query_row(SELECT_BY_ID, params![id], row_to_subscription)
            .optional()
    })
    .await
}

/// Look up a subscription by its Graph subscription id.
pub async fn get_by_subscription_id(
    db: &Database,
    subscription_id: &str,
) -> Result<Option<Subscription>, ChatMakerError> {
    let subscription_id = subscription_id.to_string();
    db.call(SELECT_BY_SUBSCRIPTION_ID, move |conn| {
        conn.query_row(
            SELECT_BY_SUBSCRIPTION_ID,
            params![subscription_id],
            row_to_subscription,
        )
        .optional()
    })
    .await
}

pub async fn update_subscription(
    db: &Database,
    subscription: &Subscription,
) -> Result<Subscription, ChatMakerError> {
    let id = subscription.id.ok_or_else(|| missing_id("subscriptions"))?;
    check_times(subscription)?;
    let s = subscription.clone();
    let updated_at = to_sql_time(&Utc::now());
    let stored = db
        .call(UPDATE, move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                UPDATE,
                params![
                    s.subscription_id,
                    s.resource,
                    s.change_type,
                    s.client_state,
                    s.notification_url,
                    to_sql_time(&s.expiration_date_time),
                    s.is_active,
                    updated_at,
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let stored = tx.query_row(SELECT_BY_ID, params![id], row_to_subscription)?;
            tx.commit()?;
            Ok(Some(stored))
        })
        .await?;
    stored.ok_or_else(|| record_not_found("subscriptions", id))
}

pub async fn delete_subscription(db: &Database, id: i64) -> Result<bool, ChatMakerError> {
    db.call(DELETE, move |conn| conn.execute(DELETE, params![id]))
        .await
        .map(|deleted| deleted > 0)
}

/// Active subscriptions that have not expired at `now`.
pub async fn list_active_at(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<Subscription>, ChatMakerError> {
    check_timestamp("now", &now)?;
    let now = to_sql_time(&now);
    db.call(SELECT_ACTIVE, move |conn| {
        query_all(conn, SELECT_ACTIVE, params![now], row_to_subscription)
    })
    .await
}

/// Subscriptions whose expiration is strictly before `now`, active or not.
pub async fn list_expired_at(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<Subscription>, ChatMakerError> {
    check_timestamp("now", &now)?;
    let now = to_sql_time(&now);
    db.call(SELECT_EXPIRED, move |conn| {
        query_all(conn, SELECT_EXPIRED, params![now], row_to_subscription)
    })
    .await
}
