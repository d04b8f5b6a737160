// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Auto Chat Maker.
//!
//! Provides layered configuration (defaults, TOML files, `.env`, process
//! environment) with strict validation (`deny_unknown_fields`), miette
//! diagnostics with typo suggestions, and a process-wide cached instance.
//!
//! # Usage
//!
//! ```no_run
//! use chatmaker_config::get_config;
//!
//! let config = get_config().expect("config errors");
//! println!("Listening on {}:{}", config.app.host, config.app.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::sync::{Arc, OnceLock};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ChatMakerConfig;

static GLOBAL: OnceLock<Arc<ChatMakerConfig>> = OnceLock::new();

/// Load configuration from the full hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so unknown keys can be
/// reported with a source span.
pub fn load_and_validate() -> Result<ChatMakerConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string (defaults underneath) and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChatMakerConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Process-wide configuration, loaded and validated on first use.
///
/// Every later call returns the same instance. A failed load is not cached,
/// so a corrected environment can succeed on the next call.
pub fn get_config() -> Result<Arc<ChatMakerConfig>, Vec<ConfigError>> {
    if let Some(config) = GLOBAL.get() {
        return Ok(Arc::clone(config));
    }
    let loaded = Arc::new(load_and_validate()?);
    tracing::debug!(environment = loaded.environment(), "configuration loaded");
    Ok(Arc::clone(GLOBAL.get_or_init(|| loaded)))
}

fn collect_toml_sources() -> Vec<(String, String)> {
    loader::toml_search_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            Some((path.display().to_string(), content))
        })
        .collect()
}
