// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User entity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatMakerError, Result};

/// A Teams user known to the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by storage on create.
    pub id: Option<i64>,
    pub email: String,
    /// Display name.
    pub name: String,
    /// Microsoft 365 user id, once the account has been linked.
    pub microsoft_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unsaved, active user. The email must not be blank.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ChatMakerError::validation("user email is required")
                .with_code("MISSING_EMAIL"));
        }
        let now = Utc::now();
        Ok(Self {
            id: None,
            email,
            name: name.into(),
            microsoft_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Link the user to a Microsoft 365 account.
    pub fn with_microsoft_id(mut self, microsoft_id: impl Into<String>) -> Self {
        self.microsoft_id = Some(microsoft_id.into());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, email={}, name={})",
            super::display_id(self.id),
            self.email,
            self.name
        )
    }
}
