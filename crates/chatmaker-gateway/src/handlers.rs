// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health and service-info handlers.
//!
//! `GET /api/health` and `GET /api/health/detailed` are authoritative.
//! `GET /health` is kept for old probes and marked deprecated.

use axum::{
    extract::State,
    http::header::{HeaderName, LINK},
    response::IntoResponse,
    Json,
};
use chatmaker_core::ComponentStatus;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::server::AppState;

const DEPRECATION: HeaderName = HeaderName::from_static("deprecation");
/// Structured-field date (`@` + unix seconds) for 2026-01-01T00:00:00Z.
const LEGACY_HEALTH_DEPRECATED_AT: &str = "@1767225600";

/// Response body for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: String,
    /// RFC 3339 UTC.
    pub timestamp: String,
    /// `development` or `production`.
    pub environment: &'static str,
}

/// Response body for `GET /api/health/detailed`.
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    pub components: Components,
    pub settings: SettingsSummary,
}

#[derive(Debug, Serialize)]
pub struct Components {
    pub database: ComponentStatus,
    pub mcp_server: ComponentStatus,
    pub claude_api: ComponentStatus,
}

/// Non-secret settings echoed by the detailed health check.
#[derive(Debug, Serialize)]
pub struct SettingsSummary {
    pub debug: bool,
    pub log_level: String,
    pub database_url: String,
    pub mcp_server_url: Option<String>,
    pub claude_api_base_url: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct LegacyHealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

fn health_snapshot(state: &AppState) -> HealthResponse {
    let config = &state.config;
    HealthResponse {
        status: "healthy",
        service: config.app.name.clone(),
        version: config.app.version.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        environment: config.environment(),
    }
}

/// GET /api/health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = health_snapshot(&state);
    info!(service = %health.service, environment = health.environment, "health check");
    Json(health)
}

/// GET /api/health/detailed
///
/// The database component reflects a live probe. MCP and Claude have no
/// client yet and always report `unknown`.
pub async fn get_detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let database = match state.database.health_check().await {
        Ok(status) => ComponentStatus::from(&status),
        Err(e) => {
            warn!(probe = state.database.name(), error = %e, "health probe failed");
            ComponentStatus::Unhealthy
        }
    };

    let config = &state.config;
    let response = DetailedHealthResponse {
        health: health_snapshot(&state),
        components: Components {
            database,
            mcp_server: ComponentStatus::Unknown,
            claude_api: ComponentStatus::Unknown,
        },
        settings: SettingsSummary {
            debug: config.app.debug,
            log_level: config.app.log_level.clone(),
            database_url: config.database.url.clone(),
            mcp_server_url: config.mcp.server_url.clone(),
            claude_api_base_url: config.claude.api_base_url.clone(),
        },
    };
    info!(database = %response.components.database, "detailed health check");
    Json(response)
}

/// GET /
pub async fn get_root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Auto Chat Maker API",
        version: state.config.app.version.clone(),
    })
}

/// GET /health (deprecated in favour of `/api/health`)
pub async fn get_legacy_health() -> impl IntoResponse {
    (
        [
            (DEPRECATION, LEGACY_HEALTH_DEPRECATED_AT),
            (LINK, "</api/health>; rel=\"successor-version\""),
        ],
        Json(LegacyHealthResponse {
            status: "healthy",
            service: "Auto Chat Maker",
        }),
    )
}
