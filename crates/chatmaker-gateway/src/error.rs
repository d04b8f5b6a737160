// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON error envelope for every failing request.
//!
//! All failures render as `{"error": {"code", "message", "details"?}}`:
//!
//! | Source | Status | Code |
//! |---|---|---|
//! | [`ChatMakerError`] | 500 | its own code, else `INTERNAL_ERROR` |
//! | request validation | 422 | `VALIDATION_ERROR` |
//! | HTTP-layer error | its status | `HTTP_{status}` |
//! | panic or opaque failure | 500 | `INTERNAL_SERVER_ERROR` |

use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatmaker_core::ChatMakerError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

/// One request validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Where the failure is, e.g. `["body", "confidence_score"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// An application error from the taxonomy.
    Domain(ChatMakerError),
    /// Request body, query or path failed validation.
    Validation(Vec<FieldError>),
    /// An HTTP-layer error with a human-readable detail.
    Http { status: StatusCode, message: String },
    /// Anything else; the detail is logged, never returned.
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// A single-field validation failure.
    pub fn invalid(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(loc, msg, kind)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Http { status, .. } => *status,
        }
    }
}

impl From<ChatMakerError> for ApiError {
    fn from(err: ChatMakerError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                Self::invalid(&["body"], e.body_text(), "value_error")
            }
            JsonRejection::JsonSyntaxError(e) => {
                Self::invalid(&["body"], e.body_text(), "json_invalid")
            }
            other => Self::Http {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        match rejection {
            QueryRejection::FailedToDeserializeQueryString(e) => {
                Self::invalid(&["query"], e.body_text(), "query_invalid")
            }
            other => Self::Http {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                Self::invalid(&["path"], e.body_text(), "path_invalid")
            }
            other => Self::Http {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body: Value = match self {
            Self::Domain(err) => {
                let code = err.code().unwrap_or("INTERNAL_ERROR");
                let details = Value::Object(err.details().clone());
                let cause = std::error::Error::source(&err).map(ToString::to_string);
                error!(
                    kind = %err.kind(),
                    code,
                    message = err.message(),
                    details = %details,
                    cause = ?cause,
                    "application error"
                );
                json!({
                    "error": {
                        "code": code,
                        "message": err.message(),
                        "details": err.details(),
                    }
                })
            }
            Self::Validation(errors) => {
                warn!(errors = ?errors, "request validation failed");
                json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "Request validation failed",
                        "details": errors,
                    }
                })
            }
            Self::Http { status, message } => {
                warn!(status = status.as_u16(), detail = %message, "http error");
                json!({
                    "error": {
                        "code": format!("HTTP_{}", status.as_u16()),
                        "message": message,
                    }
                })
            }
            Self::Internal(detail) => {
                error!(error = %detail, "unhandled error");
                json!({
                    "error": {
                        "code": "INTERNAL_SERVER_ERROR",
                        "message": "Internal server error",
                    }
                })
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked. Used with `CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(format!("panic: {detail}")).into_response()
}

/// Fallback for unknown routes.
pub async fn not_found_fallback() -> ApiError {
    ApiError::not_found("Not Found")
}

/// Fallback for a known route hit with the wrong method.
pub async fn method_not_allowed_fallback() -> ApiError {
    ApiError::Http {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "Method Not Allowed".to_string(),
    }
}
