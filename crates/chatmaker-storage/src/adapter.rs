// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the repository traits.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use chatmaker_config::model::DatabaseConfig;
use chatmaker_core::{
    ChatMessage, ChatMessageRepository, HealthProbe, HealthStatus, ReplySuggestion,
    ReplySuggestionRepository, Result, Subscription, SubscriptionRepository, User,
    UserRepository,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage for every entity.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// Share it behind an `Arc` and hand out one trait object per repository.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the configured database and apply migrations.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let db = Database::open(config).await?;
        debug!("SQLite storage initialized");
        Ok(Self::new(db))
    }

    /// Flush the WAL before the process exits.
    pub async fn shutdown(&self) -> Result<()> {
        self.db.checkpoint().await
    }

    /// Close the connection for good.
    pub async fn close(self) -> Result<()> {
        self.db.close().await
    }
}

#[async_trait]
impl HealthProbe for SqliteStorage {
    fn name(&self) -> &str {
        "database"
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        match self.db.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => {
                warn!(error = %e, "database health check failed");
                Ok(HealthStatus::Unhealthy(e.message().to_string()))
            }
        }
    }
}

#[async_trait]
impl UserRepository for SqliteStorage {
    async fn create(&self, user: &User) -> Result<User> {
        queries::users::create_user(&self.db, user).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        queries::users::get_user(&self.db, id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        queries::users::get_user_by_email(&self.db, email).await
    }

    async fn get_by_microsoft_id(&self, microsoft_id: &str) -> Result<Option<User>> {
        queries::users::get_user_by_microsoft_id(&self.db, microsoft_id).await
    }

    async fn update(&self, user: &User) -> Result<User> {
        queries::users::update_user(&self.db, user).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        queries::users::delete_user(&self.db, id).await
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        queries::users::list_users(&self.db).await
    }
}

#[async_trait]
impl ChatMessageRepository for SqliteStorage {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage> {
        queries::messages::create_message(&self.db, message).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ChatMessage>> {
        queries::messages::get_message(&self.db, id).await
    }

    async fn get_by_message_id(&self, message_id: &str) -> Result<Option<ChatMessage>> {
        queries::messages::get_message_by_message_id(&self.db, message_id).await
    }

    async fn update(&self, message: &ChatMessage) -> Result<ChatMessage> {
        queries::messages::update_message(&self.db, message).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        queries::messages::delete_message(&self.db, id).await
    }

    async fn list_unprocessed(&self) -> Result<Vec<ChatMessage>> {
        queries::messages::list_unprocessed(&self.db).await
    }

    async fn list_by_chat_id(&self, chat_id: &str) -> Result<Vec<ChatMessage>> {
        queries::messages::list_by_chat_id(&self.db, chat_id).await
    }
}

#[async_trait]
impl ReplySuggestionRepository for SqliteStorage {
    async fn create(&self, suggestion: &ReplySuggestion) -> Result<ReplySuggestion> {
        queries::suggestions::create_suggestion(&self.db, suggestion).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ReplySuggestion>> {
        queries::suggestions::get_suggestion(&self.db, id).await
    }

    async fn get_by_message_id(&self, message_id: &str) -> Result<Vec<ReplySuggestion>> {
        queries::suggestions::list_by_message_id(&self.db, message_id).await
    }

    async fn count_by_message_id(&self, message_id: &str) -> Result<u64> {
        queries::suggestions::count_by_message_id(&self.db, message_id).await
    }

    async fn update(&self, suggestion: &ReplySuggestion) -> Result<ReplySuggestion> {
        queries::suggestions::update_suggestion(&self.db, suggestion).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        queries::suggestions::delete_suggestion(&self.db, id).await
    }

    async fn list_selected(&self) -> Result<Vec<ReplySuggestion>> {
        queries::suggestions::list_selected(&self.db).await
    }

    async fn list_sent(&self) -> Result<Vec<ReplySuggestion>> {
        queries::suggestions::list_sent(&self.db).await
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteStorage {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription> {
        queries::subscriptions::create_subscription(&self.db, subscription).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        queries::subscriptions::get_subscription(&self.db, id).await
    }

    async fn get_by_subscription_id(&self, subscription_id: &str) -> Result<Option<Subscription>> {
        queries::subscriptions::get_by_subscription_id(&self.db, subscription_id).await
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription> {
        queries::subscriptions::update_subscription(&self.db, subscription).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        queries::subscriptions::delete_subscription(&self.db, id).await
    }

    async fn list_active(&self) -> Result<Vec<Subscription>> {
        queries::subscriptions::list_active_at(&self.db, Utc::now()).await
    }

    async fn list_expired(&self) -> Result<Vec<Subscription>> {
        queries::subscriptions::list_expired_at(&self.db, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> DatabaseConfig {
        DatabaseConfig {
            url: format!("sqlite:///{}", path.display()),
            echo: false,
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn repositories_share_one_database() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(
            SqliteStorage::open(&make_config(&dir.path().join("adapter.db")))
                .await
                .unwrap(),
        );
        let users: Arc<dyn UserRepository> = storage.clone();
        let messages: Arc<dyn ChatMessageRepository> = storage.clone();
        let suggestions: Arc<dyn ReplySuggestionRepository> = storage.clone();
        let subscriptions: Arc<dyn SubscriptionRepository> = storage.clone();

        let user = users
            .create(&User::new("alice@example.com", "Alice").unwrap())
            .await
            .unwrap();
        assert_eq!(users.list_all().await.unwrap(), vec![user]);

        let msg = messages
            .create(&ChatMessage::new("m-1", "c-1", "hi", "u-1", "Alice", Utc::now()))
            .await
            .unwrap();
        assert_eq!(messages.list_unprocessed().await.unwrap().len(), 1);

        let mut suggestion = suggestions
            .create(&ReplySuggestion::new(&msg.message_id, "Hello!", 0.9).unwrap())
            .await
            .unwrap();
        suggestion.mark_as_sent();
        suggestions.update(&suggestion).await.unwrap();
        assert_eq!(suggestions.list_sent().await.unwrap().len(), 1);
        assert_eq!(suggestions.list_selected().await.unwrap().len(), 1);
        assert_eq!(suggestions.count_by_message_id("m-1").await.unwrap(), 1);

        subscriptions
            .create(&Subscription::new(
                "sub-1",
                "/chats/getAllMessages",
                "https://example.com/hook",
                Utc::now() - Duration::minutes(5),
            ))
            .await
            .unwrap();
        assert!(subscriptions.list_active().await.unwrap().is_empty());
        assert_eq!(subscriptions.list_expired().await.unwrap().len(), 1);

        drop((users, messages, suggestions, subscriptions));
        let storage = Arc::try_unwrap(storage).ok().unwrap();
        storage.shutdown().await.unwrap();
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let storage = SqliteStorage::new(Database::open_in_memory().await.unwrap());
        assert_eq!(HealthProbe::name(&storage), "database");
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
