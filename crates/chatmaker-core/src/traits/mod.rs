// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the domain and its backends.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod health;
pub mod repository;

pub use health::HealthProbe;
pub use repository::{
    ChatMessageRepository, ReplySuggestionRepository, SubscriptionRepository, UserRepository,
};
