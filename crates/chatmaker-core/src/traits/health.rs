// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health probe trait for backends the health endpoints report on.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::HealthStatus;

/// A backend that can report its own health.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Human-readable name of the backend (e.g. `"sqlite"`).
    fn name(&self) -> &str;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus>;
}
