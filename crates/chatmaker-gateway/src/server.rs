// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{routing::get, Router};
use chatmaker_config::ChatMakerConfig;
use chatmaker_core::{ChatMakerError, ChatMessageRepository, HealthProbe, ReplySuggestionRepository};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::{method_not_allowed_fallback, not_found_fallback, panic_response};
use crate::{chat, handlers};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatMakerConfig>,
    pub messages: Arc<dyn ChatMessageRepository>,
    pub suggestions: Arc<dyn ReplySuggestionRepository>,
    /// Probe behind the `database` component of the detailed health check.
    pub database: Arc<dyn HealthProbe>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state from one storage backend serving every repository.
    pub fn new<S>(config: Arc<ChatMakerConfig>, storage: Arc<S>) -> Self
    where
        S: ChatMessageRepository + ReplySuggestionRepository + HealthProbe,
    {
        Self {
            config,
            messages: storage.clone(),
            suggestions: storage.clone(),
            database: storage,
            started_at: Utc::now(),
        }
    }
}

/// Build the application router.
///
/// Routes:
/// - GET /api/health, GET /api/health/detailed
/// - /api/chat/* (see [`chat::routes`])
/// - GET / and the deprecated GET /health
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/health/detailed", get(handlers::get_detailed_health))
        .nest("/chat", chat::routes());

    Router::new()
        .route("/", get(handlers::get_root))
        .route("/health", get(handlers::get_legacy_health))
        .nest("/api", api_routes)
        .fallback(not_found_fallback)
        .method_not_allowed_fallback(method_not_allowed_fallback)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Bind `app.host:app.port` and serve until `shutdown` is cancelled.
pub async fn start_server(
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ChatMakerError> {
    let addr = format!("{}:{}", state.config.app.host, state.config.app.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        ChatMakerError::network(format!("failed to bind {addr}: {e}"))
            .with_code("BIND_FAILED")
            .with_source(e)
    })?;

    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| {
            ChatMakerError::network(format!("server error: {e}")).with_source(e)
        })?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
