// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Auto Chat Maker.
//!
//! Every setting lives in exactly one section. All structs use
//! `#[serde(deny_unknown_fields)]` to reject unrecognized config keys at
//! startup. Secret-like optional fields go through [`blank_as_none`] so that an
//! empty or whitespace-only value is treated the same as an unset one.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder printed instead of secret values.
pub const REDACTED: &str = "[redacted]";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMakerConfig {
    /// Application identity, logging and bind address.
    #[serde(default)]
    pub app: AppConfig,

    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Azure AD application and session settings.
    #[serde(default)]
    pub azure: AzureConfig,

    /// Claude API settings.
    #[serde(default)]
    pub claude: ClaudeConfig,

    /// Microsoft 365 MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Microsoft Graph webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Reply generation tuning.
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Feature flags.
    #[serde(default)]
    pub features: FeatureFlags,
}

impl ChatMakerConfig {
    /// Returns a copy with every secret value replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for secret in [
            &mut config.app.secret_key,
            &mut config.azure.client_secret,
            &mut config.azure.session_secret,
            &mut config.claude.api_key,
            &mut config.mcp.api_key,
            &mut config.webhook.secret,
        ] {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        }
        config
    }

    /// `"development"` in debug mode, `"production"` otherwise.
    pub fn environment(&self) -> &'static str {
        if self.app.debug {
            "development"
        } else {
            "production"
        }
    }
}

/// Deserialize an optional string, mapping blank values to `None`.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| REDACTED)
}

/// Application identity and HTTP bind settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,

    #[serde(default)]
    pub debug: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format (`json` or `pretty`).
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub secret_key: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            debug: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
            secret_key: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("debug", &self.debug)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("secret_key", &redact(&self.secret_key))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn default_app_name() -> String {
    "Auto Chat Maker".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database URL. Only the `sqlite:` scheme is supported.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Log every SQL statement at debug level.
    #[serde(default)]
    pub echo: bool,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            echo: false,
            wal_mode: default_wal_mode(),
        }
    }
}

/// Where a SQLite database URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    /// A private in-memory database.
    Memory,
    /// A database file on disk.
    File(String),
}

impl DatabaseConfig {
    /// Resolve the SQLite location from `url`.
    ///
    /// Accepts `sqlite:///<path>`, `sqlite://<path>`, `sqlite:<path>` and the
    /// in-memory forms `sqlite::memory:` / `sqlite:///:memory:`. Returns
    /// `None` for any other scheme or an empty path.
    pub fn sqlite_location(&self) -> Option<SqliteLocation> {
        let url = self.url.trim();
        let rest = url
            .strip_prefix("sqlite:///")
            .or_else(|| url.strip_prefix("sqlite://"))
            .or_else(|| url.strip_prefix("sqlite:"))?;
        match rest {
            "" => None,
            ":memory:" => Some(SqliteLocation::Memory),
            path => Some(SqliteLocation::File(path.to_string())),
        }
    }
}

fn default_database_url() -> String {
    "sqlite:///./auto_chat_maker.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Azure AD application, token and session settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AzureConfig {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub client_id: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub client_secret: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub tenant_id: Option<String>,

    #[serde(default = "default_authority")]
    pub authority: String,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Comma-separated Graph scopes.
    #[serde(default = "default_scopes")]
    pub scopes: String,

    #[serde(default = "default_token_cache_file")]
    pub token_cache_file: String,

    /// Seconds before expiry at which a token is considered stale.
    #[serde(default = "default_token_expiration_buffer_secs")]
    pub token_expiration_buffer_secs: u64,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub session_secret: Option<String>,

    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    #[serde(default)]
    pub enable_https: bool,

    /// Comma-separated host allow-list.
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: String,
}

impl AzureConfig {
    /// Scopes split on commas, trimmed, empties dropped.
    pub fn scope_list(&self) -> Vec<String> {
        split_list(&self.scopes)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant_id: None,
            authority: default_authority(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            token_cache_file: default_token_cache_file(),
            token_expiration_buffer_secs: default_token_expiration_buffer_secs(),
            session_secret: None,
            session_timeout_secs: default_session_timeout_secs(),
            enable_https: false,
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("tenant_id", &self.tenant_id)
            .field("authority", &self.authority)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("token_cache_file", &self.token_cache_file)
            .field(
                "token_expiration_buffer_secs",
                &self.token_expiration_buffer_secs,
            )
            .field("session_secret", &redact(&self.session_secret))
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("enable_https", &self.enable_https)
            .field("allowed_hosts", &self.allowed_hosts)
            .finish()
    }
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/auth/callback".to_string()
}

fn default_scopes() -> String {
    "Chat.ReadWrite,User.Read".to_string()
}

fn default_token_cache_file() -> String {
    ".token_cache.json".to_string()
}

fn default_token_expiration_buffer_secs() -> u64 {
    300
}

fn default_session_timeout_secs() -> u64 {
    3600
}

fn default_allowed_hosts() -> String {
    "localhost,127.0.0.1".to_string()
}

/// Claude API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaudeConfig {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_claude_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_claude_model")]
    pub model: String,

    #[serde(default = "default_claude_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_claude_temperature")]
    pub temperature: f64,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_claude_api_base_url(),
            model: default_claude_model(),
            max_tokens: default_claude_max_tokens(),
            temperature: default_claude_temperature(),
        }
    }
}

impl fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_claude_api_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_claude_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_claude_max_tokens() -> u32 {
    4000
}

fn default_claude_temperature() -> f64 {
    0.7
}

/// Microsoft 365 MCP server configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub server_url: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_mcp_server_name")]
    pub server_name: String,

    #[serde(default = "default_mcp_server_version")]
    pub server_version: String,

    #[serde(default = "default_mcp_server_description")]
    pub server_description: String,

    #[serde(default = "default_mcp_connection_timeout_secs")]
    pub connection_timeout_secs: u64,

    #[serde(default = "default_mcp_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_mcp_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_mcp_auth_type")]
    pub auth_type: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub token_endpoint: Option<String>,

    #[serde(default = "default_true")]
    pub enable_chat_operations: bool,

    #[serde(default)]
    pub enable_mail_operations: bool,

    #[serde(default)]
    pub enable_calendar_operations: bool,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            server_name: default_mcp_server_name(),
            server_version: default_mcp_server_version(),
            server_description: default_mcp_server_description(),
            connection_timeout_secs: default_mcp_connection_timeout_secs(),
            max_retries: default_mcp_max_retries(),
            retry_delay_secs: default_mcp_retry_delay_secs(),
            auth_type: default_mcp_auth_type(),
            token_endpoint: None,
            enable_chat_operations: true,
            enable_mail_operations: false,
            enable_calendar_operations: false,
        }
    }
}

impl fmt::Debug for McpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpConfig")
            .field("server_url", &self.server_url)
            .field("api_key", &redact(&self.api_key))
            .field("server_name", &self.server_name)
            .field("server_version", &self.server_version)
            .field("server_description", &self.server_description)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("auth_type", &self.auth_type)
            .field("token_endpoint", &self.token_endpoint)
            .field("enable_chat_operations", &self.enable_chat_operations)
            .field("enable_mail_operations", &self.enable_mail_operations)
            .field(
                "enable_calendar_operations",
                &self.enable_calendar_operations,
            )
            .finish()
    }
}

fn default_mcp_server_name() -> String {
    "ms-365-mcp-server".to_string()
}

fn default_mcp_server_version() -> String {
    "1.0.0".to_string()
}

fn default_mcp_server_description() -> String {
    "Microsoft 365 MCP Server".to_string()
}

fn default_mcp_connection_timeout_secs() -> u64 {
    30
}

fn default_mcp_max_retries() -> u32 {
    3
}

fn default_mcp_retry_delay_secs() -> u64 {
    1
}

fn default_mcp_auth_type() -> String {
    "oauth2".to_string()
}

fn default_true() -> bool {
    true
}

/// Microsoft Graph webhook configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Shared secret used as the subscription `clientState`.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub secret: Option<String>,

    #[serde(default = "default_webhook_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,

    /// Requested lifetime of new subscriptions.
    #[serde(default = "default_subscription_expiration_secs")]
    pub subscription_expiration_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            endpoint: default_webhook_endpoint(),
            timeout_secs: default_webhook_timeout_secs(),
            subscription_expiration_secs: default_subscription_expiration_secs(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &redact(&self.secret))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "subscription_expiration_secs",
                &self.subscription_expiration_secs,
            )
            .finish()
    }
}

fn default_webhook_endpoint() -> String {
    "/api/webhook/microsoft-graph".to_string()
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

fn default_subscription_expiration_secs() -> u64 {
    3600
}

/// Reply generation tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Minimum confidence for a suggestion to be offered.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Upper bound on stored suggestions per message.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: u32,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            interval_secs: default_interval_secs(),
            quality_threshold: default_quality_threshold(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_batch_size() -> u32 {
    10
}

fn default_interval_secs() -> u64 {
    300
}

fn default_quality_threshold() -> f64 {
    0.8
}

fn default_max_suggestions() -> u32 {
    3
}

/// Feature flags.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureFlags {
    #[serde(default = "default_true")]
    pub enable_teams_plugin: bool,

    #[serde(default)]
    pub enable_mail_plugin: bool,

    #[serde(default = "default_true")]
    pub enable_ai_processing: bool,

    #[serde(default = "default_true")]
    pub enable_webhook_processing: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_teams_plugin: true,
            enable_mail_plugin: false,
            enable_ai_processing: true,
            enable_webhook_processing: true,
        }
    }
}
