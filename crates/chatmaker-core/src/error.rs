// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Auto Chat Maker backend.
//!
//! Every failure raised by business code is a [`ChatMakerError`] tagged with an
//! [`ErrorKind`]. Kinds carry no behavior of their own; the HTTP boundary uses
//! them (together with the optional error code) to build the response envelope.

use serde_json::{Map, Value};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Structured detail mapping attached to an error.
pub type ErrorDetails = Map<String, Value>;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, ChatMakerError>;

/// The kind of a [`ChatMakerError`].
///
/// `RateLimit`, `Timeout` and `Network` are refinements of `ExternalService`;
/// use [`ErrorKind::is_a`] to test membership including the parent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid or missing configuration.
    Configuration,
    /// Caller identity could not be established.
    Authentication,
    /// Caller is known but not allowed to perform the operation.
    Authorization,
    /// MCP server could not be reached.
    McpConnection,
    /// MCP server rejected or failed an operation.
    McpOperation,
    /// Webhook notification handling failed.
    Webhook,
    /// Reply generation failed.
    AiProcessing,
    /// Persistence layer failure.
    Database,
    /// Domain-level validation failure.
    Validation,
    /// Generic failure of an external service.
    ExternalService,
    /// External service rate limit exceeded.
    RateLimit,
    /// External service call timed out.
    Timeout,
    /// Network failure talking to an external service.
    Network,
}

impl ErrorKind {
    /// Returns the parent kind, if this kind refines another one.
    pub fn parent(self) -> Option<ErrorKind> {
        match self {
            ErrorKind::RateLimit | ErrorKind::Timeout | ErrorKind::Network => {
                Some(ErrorKind::ExternalService)
            }
            _ => None,
        }
    }

    /// Returns true if `self` is `other` or refines `other`.
    pub fn is_a(self, other: ErrorKind) -> bool {
        self == other || self.parent() == Some(other)
    }
}

/// The primary error type of the workspace.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ChatMakerError {
    kind: ErrorKind,
    message: String,
    code: Option<String>,
    details: ErrorDetails,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ChatMakerError {
    /// Create an error of the given kind with no code and empty details.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            details: ErrorDetails::new(),
            source: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn mcp_connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::McpConnection, message)
    }

    pub fn mcp_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::McpOperation, message)
    }

    pub fn webhook(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Webhook, message)
    }

    pub fn ai_processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AiProcessing, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Attach a machine-readable error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add one entry to the detail mapping.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Replace the detail mapping.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    /// Shorthand for `self.kind().is_a(kind)`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind.is_a(kind)
    }
}
