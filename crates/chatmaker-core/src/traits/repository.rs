// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository contracts for the domain entities.
//!
//! Implementations assign ids on `create` and return the stored record.
//! `delete` returns `false` when no record had the given id.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatMessage, ReplySuggestion, Subscription, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a user by Microsoft 365 user id.
    async fn get_by_microsoft_id(&self, microsoft_id: &str) -> Result<Option<User>>;

    async fn update(&self, user: &User) -> Result<User>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn list_all(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ChatMessage>>;

    /// Look up a message by its Teams message id.
    async fn get_by_message_id(&self, message_id: &str) -> Result<Option<ChatMessage>>;

    async fn update(&self, message: &ChatMessage) -> Result<ChatMessage>;

    async fn delete(&self, id: i64) -> Result<bool>;

    /// Messages not yet marked processed, oldest first.
    async fn list_unprocessed(&self) -> Result<Vec<ChatMessage>>;

    async fn list_by_chat_id(&self, chat_id: &str) -> Result<Vec<ChatMessage>>;
}

#[async_trait]
pub trait ReplySuggestionRepository: Send + Sync {
    async fn create(&self, suggestion: &ReplySuggestion) -> Result<ReplySuggestion>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ReplySuggestion>>;

    /// All suggestions for the given Teams message id.
    async fn get_by_message_id(&self, message_id: &str) -> Result<Vec<ReplySuggestion>>;

    async fn count_by_message_id(&self, message_id: &str) -> Result<u64>;

    async fn update(&self, suggestion: &ReplySuggestion) -> Result<ReplySuggestion>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn list_selected(&self) -> Result<Vec<ReplySuggestion>>;

    async fn list_sent(&self) -> Result<Vec<ReplySuggestion>>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>>;

    /// Look up a subscription by its Microsoft Graph subscription id.
    async fn get_by_subscription_id(&self, subscription_id: &str)
        -> Result<Option<Subscription>>;

    async fn update(&self, subscription: &Subscription) -> Result<Subscription>;

    async fn delete(&self, id: i64) -> Result<bool>;

    /// Active subscriptions that have not expired yet.
    async fn list_active(&self) -> Result<Vec<Subscription>>;

    /// Subscriptions whose expiration is in the past, active or not.
    async fn list_expired(&self) -> Result<Vec<Subscription>>;
}
