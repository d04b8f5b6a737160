// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by storage, gateway and the binary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// Per-component status as reported by the detailed health endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// No probe exists for the component yet.
    Unknown,
}

impl From<&HealthStatus> for ComponentStatus {
    fn from(status: &HealthStatus) -> Self {
        match status {
            HealthStatus::Healthy => ComponentStatus::Healthy,
            HealthStatus::Degraded(_) => ComponentStatus::Degraded,
            HealthStatus::Unhealthy(_) => ComponentStatus::Unhealthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn component_status_from_health() {
        assert_eq!(
            ComponentStatus::from(&HealthStatus::Healthy),
            ComponentStatus::Healthy
        );
        assert_eq!(
            ComponentStatus::from(&HealthStatus::Degraded("slow".into())),
            ComponentStatus::Degraded
        );
        assert_eq!(
            ComponentStatus::from(&HealthStatus::Unhealthy("down".into())),
            ComponentStatus::Unhealthy
        );
    }

    #[test]
    fn component_status_serializes_snake_case() {
        let json = serde_json::to_string(&ComponentStatus::Unknown).unwrap();
        assert_eq!(json, "\"unknown\"");
        assert_eq!(ComponentStatus::Healthy.to_string(), "healthy");
        assert_eq!(
            ComponentStatus::from_str("unhealthy").unwrap(),
            ComponentStatus::Unhealthy
        );
    }
}
