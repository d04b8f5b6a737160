// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message and reply suggestion routes under `/api/chat`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chatmaker_core::{check_timestamp, ChatMessage, ReplySuggestion};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ApiError, FieldError};
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Routes mounted at `/api/chat`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(create_message).get(list_messages))
        .route("/messages/{id}", get(get_message))
        .route("/messages/{id}/processed", post(mark_processed))
        .route("/suggestions", post(create_suggestion).get(list_suggestions))
        .route("/suggestions/{id}/select", post(select_suggestion))
        .route("/suggestions/{id}/sent", post(mark_sent))
}

/// Request body for `POST /api/chat/messages`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub message_id: String,
    pub chat_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    #[serde(default)]
    pub message_type: Option<String>,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageListQuery {
    pub chat_id: Option<String>,
    #[serde(default)]
    pub unprocessed: bool,
}

/// Request body for `POST /api/chat/suggestions`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSuggestionRequest {
    /// Teams message id of an existing message.
    pub message_id: String,
    pub content: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionState {
    Selected,
    Sent,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestionListQuery {
    pub message_id: Option<String>,
    pub state: Option<SuggestionState>,
}

fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(
            &["body", field],
            "must not be blank",
            "string_too_short",
        ));
    }
}

fn check(errors: Vec<FieldError>) -> ApiResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// POST /api/chat/messages
async fn create_message(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateMessageRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let mut errors = Vec::new();
    require_text(&mut errors, "message_id", &body.message_id);
    require_text(&mut errors, "chat_id", &body.chat_id);
    require_text(&mut errors, "sender_id", &body.sender_id);
    check(errors)?;
    check_timestamp("sent_at", &body.sent_at)
        .map_err(|e| ApiError::invalid(&["body", "sent_at"], e.message(), "value_error"))?;

    if state.messages.get_by_message_id(&body.message_id).await?.is_some() {
        return Err(ApiError::Http {
            status: StatusCode::CONFLICT,
            message: format!("message {} already exists", body.message_id),
        });
    }

    let mut message = ChatMessage::new(
        body.message_id,
        body.chat_id,
        body.content,
        body.sender_id,
        body.sender_name,
        body.sent_at,
    );
    message.thread_id = body.thread_id;
    if let Some(message_type) = body.message_type {
        message.message_type = message_type;
    }
    message.metadata = body.metadata;

    let stored = state.messages.create(&message).await?;
    info!(id = ?stored.id, message_id = %stored.message_id, "chat message stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/chat/messages?chat_id=&unprocessed=
///
/// Without `chat_id` only the unprocessed backlog can be listed.
async fn list_messages(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<MessageListQuery>, ApiError>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = match query.chat_id {
        Some(chat_id) => {
            let mut messages = state.messages.list_by_chat_id(&chat_id).await?;
            if query.unprocessed {
                messages.retain(|m| !m.is_processed);
            }
            messages
        }
        None if query.unprocessed => state.messages.list_unprocessed().await?,
        None => {
            return Err(ApiError::invalid(
                &["query", "chat_id"],
                "chat_id is required unless unprocessed=true",
                "missing",
            ));
        }
    };
    Ok(Json(messages))
}

/// GET /api/chat/messages/{id}
async fn get_message(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<ChatMessage>> {
    state
        .messages
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("message {id} not found")))
}

/// POST /api/chat/messages/{id}/processed
async fn mark_processed(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<ChatMessage>> {
    let mut message = state
        .messages
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("message {id} not found")))?;
    message.mark_as_processed();
    let stored = state.messages.update(&message).await?;
    info!(id, message_id = %stored.message_id, "chat message processed");
    Ok(Json(stored))
}

/// POST /api/chat/suggestions
///
/// The message must exist and hold fewer than `reply.max_suggestions`
/// suggestions.
async fn create_suggestion(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateSuggestionRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ReplySuggestion>)> {
    let mut errors = Vec::new();
    require_text(&mut errors, "message_id", &body.message_id);
    require_text(&mut errors, "content", &body.content);
    check(errors)?;

    let suggestion = ReplySuggestion::new(&body.message_id, body.content, body.confidence_score)
        .map_err(|e| ApiError::invalid(&["body", "confidence_score"], e.message(), "value_error"))?;

    if state.messages.get_by_message_id(&body.message_id).await?.is_none() {
        return Err(ApiError::invalid(
            &["body", "message_id"],
            format!("unknown message {}", body.message_id),
            "value_error",
        ));
    }

    let limit = u64::from(state.config.reply.max_suggestions);
    let existing = state.suggestions.count_by_message_id(&body.message_id).await?;
    if existing >= limit {
        return Err(ApiError::invalid(
            &["body", "message_id"],
            format!("message already has the maximum of {limit} suggestions"),
            "value_error",
        ));
    }

    let stored = state.suggestions.create(&suggestion).await?;
    info!(id = ?stored.id, message_id = %stored.message_id, "reply suggestion stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/chat/suggestions?message_id=&state=selected|sent
async fn list_suggestions(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<SuggestionListQuery>, ApiError>,
) -> ApiResult<Json<Vec<ReplySuggestion>>> {
    let suggestions = match (query.message_id, query.state) {
        (Some(message_id), filter) => {
            let mut suggestions = state.suggestions.get_by_message_id(&message_id).await?;
            match filter {
                Some(SuggestionState::Selected) => suggestions.retain(|s| s.is_selected),
                Some(SuggestionState::Sent) => suggestions.retain(|s| s.is_sent),
                None => {}
            }
            suggestions
        }
        (None, Some(SuggestionState::Selected)) => state.suggestions.list_selected().await?,
        (None, Some(SuggestionState::Sent)) => state.suggestions.list_sent().await?,
        (None, None) => {
            return Err(ApiError::invalid(
                &["query", "message_id"],
                "message_id or state is required",
                "missing",
            ));
        }
    };
    Ok(Json(suggestions))
}

async fn load_suggestion(state: &AppState, id: i64) -> ApiResult<ReplySuggestion> {
    state
        .suggestions
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("suggestion {id} not found")))
}

/// POST /api/chat/suggestions/{id}/select
async fn select_suggestion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<ReplySuggestion>> {
    let mut suggestion = load_suggestion(&state, id).await?;
    suggestion.select();
    Ok(Json(state.suggestions.update(&suggestion).await?))
}

/// POST /api/chat/suggestions/{id}/sent
async fn mark_sent(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Json<ReplySuggestion>> {
    let mut suggestion = load_suggestion(&state, id).await?;
    suggestion.mark_as_sent();
    let stored = state.suggestions.update(&suggestion).await?;
    info!(id, message_id = %stored.message_id, "reply suggestion sent");
    Ok(Json(stored))
}
