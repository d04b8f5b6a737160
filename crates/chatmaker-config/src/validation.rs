// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as bounded ratios, known log levels and the database scheme.

use crate::diagnostic::ConfigError;
use crate::model::ChatMakerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatMakerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.app.port == 0 {
        fail("app.port must be between 1 and 65535".to_string());
    }

    if config.app.host.trim().is_empty() {
        fail("app.host must not be empty".to_string());
    }

    let level = config.app.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "app.log_level `{}` is not one of {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let format = config.app.log_format.to_ascii_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        fail(format!(
            "app.log_format `{}` is not one of {}",
            config.app.log_format,
            LOG_FORMATS.join(", ")
        ));
    }

    if config.database.sqlite_location().is_none() {
        fail(format!(
            "database.url `{}` must be a sqlite URL such as sqlite:///./auto_chat_maker.db",
            config.database.url
        ));
    }

    if !(0.0..=1.0).contains(&config.claude.temperature) {
        fail(format!(
            "claude.temperature must be within [0, 1], got {}",
            config.claude.temperature
        ));
    }

    if !(0.0..=1.0).contains(&config.reply.quality_threshold) {
        fail(format!(
            "reply.quality_threshold must be within [0, 1], got {}",
            config.reply.quality_threshold
        ));
    }

    if config.reply.max_suggestions == 0 {
        fail("reply.max_suggestions must be at least 1".to_string());
    }

    if config.reply.batch_size == 0 {
        fail("reply.batch_size must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
