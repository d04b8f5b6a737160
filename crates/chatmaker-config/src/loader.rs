// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/chatmaker/chatmaker.toml` (system-wide)
//! 3. `~/.config/chatmaker/chatmaker.toml` (user config)
//! 4. `./chatmaker.toml` (local directory)
//! 5. `./.env` entries
//! 6. Process environment variables
//!
//! Environment names are the flat names operators already use
//! (`DATABASE_URL`, `CLAUDE_API_KEY`, ...), matched case-insensitively.
//! The `AZURE_*` / `MCP_*` group names are accepted as aliases; when an alias
//! and a primary name target the same field, the primary name wins.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map, Value},
    Error, Figment, Metadata, Profile, Provider, Source,
};

use crate::model::ChatMakerConfig;

/// Local TOML file name.
pub const CONFIG_FILE_NAME: &str = "chatmaker.toml";

/// Local dotenv file name.
pub const DOTENV_FILE_NAME: &str = ".env";

const SYSTEM_CONFIG_PATH: &str = "/etc/chatmaker/chatmaker.toml";

/// How an environment value is turned into a config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvValueKind {
    /// Kept as the literal text, whatever it looks like.
    Text,
    /// Parsed as a TOML-like scalar (bool, integer, float).
    Typed,
}

use EnvValueKind::{Text, Typed};

type EnvTable = &'static [(&'static str, &'static str, EnvValueKind)];

/// Primary environment variable names (lowercase) and the key each sets.
const ENV_KEYS: EnvTable = &[
    ("app_name", "app.name", Text),
    ("app_version", "app.version", Text),
    ("debug", "app.debug", Typed),
    ("log_level", "app.log_level", Text),
    ("log_format", "app.log_format", Text),
    ("secret_key", "app.secret_key", Text),
    ("host", "app.host", Text),
    ("port", "app.port", Typed),
    ("database_url", "database.url", Text),
    ("database_echo", "database.echo", Typed),
    ("database_wal_mode", "database.wal_mode", Typed),
    ("microsoft_client_id", "azure.client_id", Text),
    ("microsoft_client_secret", "azure.client_secret", Text),
    ("microsoft_tenant_id", "azure.tenant_id", Text),
    ("azure_ad_authority", "azure.authority", Text),
    ("azure_ad_scopes", "azure.scopes", Text),
    ("claude_api_key", "claude.api_key", Text),
    ("claude_api_base_url", "claude.api_base_url", Text),
    ("claude_model", "claude.model", Text),
    ("claude_max_tokens", "claude.max_tokens", Typed),
    ("claude_temperature", "claude.temperature", Typed),
    ("mcp_server_url", "mcp.server_url", Text),
    ("mcp_api_key", "mcp.api_key", Text),
    ("mcp_server_name", "mcp.server_name", Text),
    ("mcp_server_version", "mcp.server_version", Text),
    ("mcp_server_description", "mcp.server_description", Text),
    ("mcp_connection_timeout", "mcp.connection_timeout_secs", Typed),
    ("mcp_max_retries", "mcp.max_retries", Typed),
    ("webhook_secret", "webhook.secret", Text),
    ("webhook_endpoint", "webhook.endpoint", Text),
    ("webhook_timeout", "webhook.timeout_secs", Typed),
    ("webhook_subscription_expiration", "webhook.subscription_expiration_secs", Typed),
    ("reply_generation_batch_size", "reply.batch_size", Typed),
    ("reply_generation_interval", "reply.interval_secs", Typed),
    ("reply_quality_threshold", "reply.quality_threshold", Typed),
    ("max_reply_suggestions", "reply.max_suggestions", Typed),
    ("enable_teams_plugin", "features.enable_teams_plugin", Typed),
    ("enable_mail_plugin", "features.enable_mail_plugin", Typed),
    ("enable_ai_processing", "features.enable_ai_processing", Typed),
    ("enable_webhook_processing", "features.enable_webhook_processing", Typed),
];

/// Group-prefixed names from the Azure and MCP setting groups.
const GROUP_ENV_KEYS: EnvTable = &[
    ("azure_client_id", "azure.client_id", Text),
    ("azure_client_secret", "azure.client_secret", Text),
    ("azure_tenant_id", "azure.tenant_id", Text),
    ("azure_authority", "azure.authority", Text),
    ("azure_redirect_uri", "azure.redirect_uri", Text),
    ("azure_scopes", "azure.scopes", Text),
    ("azure_token_cache_file", "azure.token_cache_file", Text),
    ("azure_token_expiration_buffer", "azure.token_expiration_buffer_secs", Typed),
    ("azure_session_secret", "azure.session_secret", Text),
    ("azure_session_timeout", "azure.session_timeout_secs", Typed),
    ("azure_enable_https", "azure.enable_https", Typed),
    ("azure_allowed_hosts", "azure.allowed_hosts", Text),
    ("mcp_retry_delay", "mcp.retry_delay_secs", Typed),
    ("mcp_auth_type", "mcp.auth_type", Text),
    ("mcp_token_endpoint", "mcp.token_endpoint", Text),
    ("mcp_enable_chat_operations", "mcp.enable_chat_operations", Typed),
    ("mcp_enable_mail_operations", "mcp.enable_mail_operations", Typed),
    ("mcp_enable_calendar_operations", "mcp.enable_calendar_operations", Typed),
];

fn lookup(table: EnvTable, name: &str) -> Option<(&'static str, EnvValueKind)> {
    let name = name.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(env, _, _)| *env == name)
        .map(|(_, path, kind)| (*path, *kind))
}

/// Config key set by a primary environment variable name, if any.
pub fn env_key_path(name: &str) -> Option<&'static str> {
    lookup(ENV_KEYS, name).map(|(path, _)| path)
}

/// Config key set by a group-prefixed alias name, if any.
pub fn group_env_key_path(name: &str) -> Option<&'static str> {
    lookup(GROUP_ENV_KEYS, name).map(|(path, _)| path)
}

/// Convert a raw environment value for a key of the given kind.
pub fn env_value(raw: &str, kind: EnvValueKind) -> Value {
    match kind {
        Text => Value::from(raw.to_string()),
        Typed => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| Value::from(raw.to_string())),
    }
}

/// Fold `(name, value)` pairs into config data in the default profile.
///
/// Group aliases are merged first so primary names override them.
fn env_data<I>(vars: I) -> Result<Map<Profile, Dict>, Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut group = Vec::new();
    let mut primary = Vec::new();
    for (name, raw) in vars {
        if let Some((path, kind)) = lookup(ENV_KEYS, &name) {
            primary.push((path, env_value(&raw, kind)));
        } else if let Some((path, kind)) = lookup(GROUP_ENV_KEYS, &name) {
            group.push((path, env_value(&raw, kind)));
        }
    }

    group
        .into_iter()
        .chain(primary)
        .fold(Figment::new(), |figment, (path, value)| {
            figment.merge(Serialized::default(path, value))
        })
        .data()
}

/// Load configuration from the full hierarchy.
pub fn load_config() -> Result<ChatMakerConfig, Error> {
    build_figment().extract()
}

/// Load configuration from defaults plus a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatMakerConfig, Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatMakerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific TOML file with `.env` and env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatMakerConfig, Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatMakerConfig::default()))
        .merge(Toml::file(path))
        .merge(DotenvFile::new(DOTENV_FILE_NAME))
        .merge(ProcessEnv)
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChatMakerConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(DotenvFile::new(DOTENV_FILE_NAME))
        .merge(ProcessEnv)
}

/// Paths of every TOML file the hierarchy reads, highest priority first.
pub fn toml_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(user) = user_config_path() {
        paths.push(user);
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    paths
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatmaker").join(CONFIG_FILE_NAME))
}

/// Provider reading the recognised names from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Provider for ProcessEnv {
    fn metadata(&self) -> Metadata {
        Metadata::named("environment variable(s)")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        env_data(Env::raw().iter().map(|(name, raw)| (name.to_string(), raw)))
    }
}

/// Provider reading `KEY=value` pairs from a dotenv file.
///
/// The process environment is never modified; unrecognised names are ignored
/// and a missing file provides nothing.
#[derive(Debug, Clone)]
pub struct DotenvFile {
    path: PathBuf,
}

impl DotenvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Provider for DotenvFile {
    fn metadata(&self) -> Metadata {
        Metadata::named("dotenv file").source(Source::File(self.path.clone()))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => return Ok(Map::new()),
            Err(e) => {
                return Err(Error::from(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let vars = entries
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::from(format!("failed to parse {}: {e}", self.path.display())))?;
        env_data(vars)
    }
}
