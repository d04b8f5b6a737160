// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message entity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default `message_type` for plain Teams messages.
pub const DEFAULT_MESSAGE_TYPE: &str = "text";

/// A Teams chat message captured for reply generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    /// Teams message id. Unique per source system.
    pub message_id: String,
    pub chat_id: String,
    pub thread_id: Option<String>,
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message_type: String,
    pub sent_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub is_processed: bool,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create an unsaved, unprocessed text message.
    pub fn new(
        message_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            message_id: message_id.into(),
            chat_id: chat_id.into(),
            thread_id: None,
            content: content.into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            sent_at,
            processed_at: None,
            is_processed: false,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the message as processed. Repeated calls only advance timestamps.
    pub fn mark_as_processed(&mut self) {
        let now = Utc::now();
        self.is_processed = true;
        self.processed_at = Some(now);
        self.updated_at = now;
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChatMessage(id={}, message_id={}, sender={})",
            super::display_id(self.id),
            self.message_id,
            self.sender_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatMessage {
        ChatMessage::new("msg-1", "chat-1", "hello", "u-1", "Alice", Utc::now())
    }

    #[test]
    fn new_message_is_unprocessed_text() {
        let msg = sample();
        assert!(!msg.is_processed);
        assert!(msg.processed_at.is_none());
        assert_eq!(msg.message_type, "text");
        assert!(msg.metadata.is_empty());
        assert!(msg.thread_id.is_none());
    }

    #[test]
    fn mark_as_processed_sets_flag_and_timestamps() {
        let mut msg = sample();
        let before = msg.updated_at;
        msg.mark_as_processed();
        assert!(msg.is_processed);
        let processed_at = msg.processed_at.expect("processed_at set");
        assert!(processed_at >= before);
        assert_eq!(msg.updated_at, processed_at);
    }

    #[test]
    fn mark_as_processed_twice_keeps_flag() {
        let mut msg = sample();
        msg.mark_as_processed();
        let first = msg.updated_at;
        msg.mark_as_processed();
        assert!(msg.is_processed);
        assert!(msg.updated_at >= first);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn display_uses_sender_name() {
        let msg = sample();
        assert_eq!(
            msg.to_string(),
            "ChatMessage(id=None, message_id=msg-1, sender=Alice)"
        );
    }
}
