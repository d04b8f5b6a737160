// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for Auto Chat Maker.
//!
//! Serves the health endpoints and the `/api/chat` message and reply
//! suggestion routes. Every failure is rendered through [`ApiError`] as a
//! JSON error envelope.

pub mod chat;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, FieldError};
pub use server::{build_router, start_server, AppState};
