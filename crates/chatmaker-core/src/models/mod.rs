// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entities.
//!
//! Entities are plain records. Identity is the storage-assigned `id`; records
//! that have not been persisted yet carry `id: None`.

pub mod chat_message;
pub mod reply_suggestion;
pub mod subscription;
pub mod user;

use chrono::{DateTime, Datelike, Utc};

use crate::error::{ChatMakerError, Result};

pub use chat_message::ChatMessage;
pub use reply_suggestion::ReplySuggestion;
pub use subscription::Subscription;
pub use user::User;

/// Latest year a stored timestamp may carry.
pub const MAX_TIMESTAMP_YEAR: i32 = 9999;

/// Reject timestamps outside years `0000..=9999`.
///
/// Only those have a four-digit RFC 3339 form, which keeps stored timestamps
/// fixed-width and readable back.
pub fn check_timestamp(field: &str, t: &DateTime<Utc>) -> Result<()> {
    if (0..=MAX_TIMESTAMP_YEAR).contains(&t.year()) {
        Ok(())
    } else {
        Err(ChatMakerError::validation(format!(
            "{field} must fall within years 0000 to 9999, got year {}",
            t.year()
        ))
        .with_code("INVALID_TIMESTAMP")
        .with_detail("field", field))
    }
}

/// Render an optional id the way the entity `Display` impls expect.
fn display_id(id: Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;

    #[test]
    fn four_digit_years_are_accepted() {
        for year in [0, 1970, 2026, 9999] {
            let t = Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap();
            assert!(check_timestamp("sent_at", &t).is_ok(), "year {year}");
        }
    }

    #[test]
    fn years_outside_four_digits_are_rejected() {
        for year in [-1, 10000, 99_999] {
            let t = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
            let err = check_timestamp("sent_at", &t).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.code(), Some("INVALID_TIMESTAMP"));
            assert_eq!(err.details()["field"], "sent_at");
        }
    }
}
