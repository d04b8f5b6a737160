// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Auto Chat Maker backend.
//!
//! Provides the error taxonomy, the domain entities (users, chat messages,
//! reply suggestions, webhook subscriptions) and the repository traits that
//! storage backends implement.

pub mod error;
pub mod models;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ChatMakerError, ErrorDetails, ErrorKind, Result};
pub use models::{check_timestamp, ChatMessage, ReplySuggestion, Subscription, User};
pub use types::{ComponentStatus, HealthStatus};

pub use traits::{
    ChatMessageRepository, HealthProbe, ReplySuggestionRepository, SubscriptionRepository,
    UserRepository,
};
