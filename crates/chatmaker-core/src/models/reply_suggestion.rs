// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply suggestion entity.
//!
//! A suggestion moves through `unselected -> selected -> sent`. Marking a
//! suggestion as sent also selects it, so `is_sent` always implies
//! `is_selected` for values produced through these methods.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatMakerError, Result};

/// A generated candidate reply to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplySuggestion {
    pub id: Option<i64>,
    /// Teams message id of the message being replied to.
    pub message_id: String,
    pub content: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence_score: f64,
    pub is_selected: bool,
    pub is_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reject scores outside `[0, 1]` (NaN included).
pub fn check_confidence(score: f64) -> Result<()> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(
            ChatMakerError::validation(format!(
                "confidence score must be within [0, 1], got {score}"
            ))
            .with_code("INVALID_CONFIDENCE_SCORE")
            .with_detail("confidence_score", score.to_string()),
        )
    }
}

impl ReplySuggestion {
    pub fn new(
        message_id: impl Into<String>,
        content: impl Into<String>,
        confidence_score: f64,
    ) -> Result<Self> {
        check_confidence(confidence_score)?;
        let now = Utc::now();
        Ok(Self {
            id: None,
            message_id: message_id.into(),
            content: content.into(),
            confidence_score,
            is_selected: false,
            is_sent: false,
            sent_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn select(&mut self) {
        self.is_selected = true;
        self.updated_at = Utc::now();
    }

    /// Mark as sent. Re-sending restamps `sent_at` and `updated_at`.
    pub fn mark_as_sent(&mut self) {
        let now = Utc::now();
        self.is_selected = true;
        self.is_sent = true;
        self.sent_at = Some(now);
        self.updated_at = now;
    }

    /// Check the field-level invariants of a suggestion built by hand.
    pub fn validate(&self) -> Result<()> {
        check_confidence(self.confidence_score)?;
        if self.is_sent && !self.is_selected {
            return Err(ChatMakerError::validation(
                "a sent reply suggestion must also be selected",
            )
            .with_code("SENT_NOT_SELECTED"));
        }
        Ok(())
    }
}

impl fmt::Display for ReplySuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReplySuggestion(id={}, message_id={}, confidence={})",
            super::display_id(self.id),
            self.message_id,
            self.confidence_score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn new_suggestion_is_unselected() {
        let s = ReplySuggestion::new("msg-1", "Sounds good", 0.9).unwrap();
        assert!(!s.is_selected);
        assert!(!s.is_sent);
        assert!(s.sent_at.is_none());
    }

    #[test]
    fn select_then_send() {
        let mut s = ReplySuggestion::new("msg-1", "Sure", 0.5).unwrap();
        s.select();
        assert!(s.is_selected);
        assert!(!s.is_sent);
        s.mark_as_sent();
        assert!(s.is_selected);
        assert!(s.is_sent);
        assert_eq!(s.sent_at, Some(s.updated_at));
    }

    #[test]
    fn sending_unselected_suggestion_selects_it() {
        let mut s = ReplySuggestion::new("msg-1", "Sure", 0.5).unwrap();
        s.mark_as_sent();
        assert!(s.is_selected);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn mark_as_sent_twice_only_advances_timestamps() {
        let mut s = ReplySuggestion::new("msg-1", "Sure", 0.5).unwrap();
        s.mark_as_sent();
        let first = s.sent_at.unwrap();
        s.mark_as_sent();
        assert!(s.is_sent);
        assert!(s.sent_at.unwrap() >= first);
        assert_eq!(s.content, "Sure");
    }

    #[test]
    fn validate_rejects_sent_without_selected() {
        let mut s = ReplySuggestion::new("msg-1", "Sure", 0.5).unwrap();
        s.is_sent = true;
        let err = s.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), Some("SENT_NOT_SELECTED"));
    }

    #[test]
    fn nan_confidence_is_rejected() {
        assert!(ReplySuggestion::new("m", "c", f64::NAN).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(ReplySuggestion::new("m", "c", 0.0).is_ok());
        assert!(ReplySuggestion::new("m", "c", 1.0).is_ok());
    }

    proptest! {
        #[test]
        fn out_of_range_confidence_is_rejected(score in prop_oneof![
            -1.0e6f64..-f64::EPSILON,
            1.0f64 + 1.0e-9..1.0e6f64,
        ]) {
            let err = ReplySuggestion::new("m", "c", score).unwrap_err();
            prop_assert_eq!(err.code(), Some("INVALID_CONFIDENCE_SCORE"));
        }

        #[test]
        fn in_range_confidence_is_accepted(score in 0.0f64..=1.0) {
            prop_assert!(ReplySuggestion::new("m", "c", score).is_ok());
        }
    }
}
