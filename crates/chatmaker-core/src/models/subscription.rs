// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Microsoft Graph change-notification subscription entity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default change types requested from Microsoft Graph.
pub const DEFAULT_CHANGE_TYPE: &str = "created,updated";

/// A webhook subscription and its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Option<i64>,
    /// Graph subscription id.
    pub subscription_id: String,
    pub resource: String,
    pub change_type: String,
    pub client_state: Option<String>,
    pub notification_url: String,
    pub expiration_date_time: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(
        subscription_id: impl Into<String>,
        resource: impl Into<String>,
        notification_url: impl Into<String>,
        expiration_date_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            subscription_id: subscription_id.into(),
            resource: resource.into(),
            change_type: DEFAULT_CHANGE_TYPE.to_string(),
            client_state: None,
            notification_url: notification_url.into(),
            expiration_date_time,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the current time is past the expiration.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        at > self.expiration_date_time
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subscription(id={}, subscription_id={}, resource={})",
            super::display_id(self.id),
            self.subscription_id,
            self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(expires_in: Duration) -> Subscription {
        Subscription::new(
            "sub-1",
            "/chats/getAllMessages",
            "https://example.com/api/webhook/microsoft-graph",
            Utc::now() + expires_in,
        )
    }

    #[test]
    fn new_subscription_is_active_with_default_change_type() {
        let sub = sample(Duration::hours(1));
        assert!(sub.is_active);
        assert_eq!(sub.change_type, "created,updated");
        assert!(sub.client_state.is_none());
    }

    #[test]
    fn expiration_is_strictly_after() {
        let sub = sample(Duration::hours(1));
        let exp = sub.expiration_date_time;
        assert!(!sub.is_expired_at(exp));
        assert!(sub.is_expired_at(exp + Duration::milliseconds(1)));
        assert!(!sub.is_expired());
    }

    #[test]
    fn past_expiration_is_expired() {
        let sub = sample(Duration::hours(-1));
        assert!(sub.is_expired());
    }

    #[test]
    fn deactivate_and_activate_are_idempotent() {
        let mut sub = sample(Duration::hours(1));
        sub.deactivate();
        sub.deactivate();
        assert!(!sub.is_active);
        let stamp = sub.updated_at;
        sub.activate();
        sub.activate();
        assert!(sub.is_active);
        assert!(sub.updated_at >= stamp);
    }

    #[test]
    fn display_matches_record_form() {
        let mut sub = sample(Duration::hours(1));
        sub.id = Some(3);
        assert_eq!(
            sub.to_string(),
            "Subscription(id=3, subscription_id=sub-1, resource=/chats/getAllMessages)"
        );
    }
}
