use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    Unknown,
}

impl HealthStatus {
    pub fn code(&self) -> &'static str {
        match self {
            HealthStatus::Up => "UP",
            HealthStatus::Down => "DOWN",
            HealthStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Immutable status plus diagnostic details, produced fresh per check.
///
/// Serializes as `{"status": "UP", "details": {...}}`; `details` is left
/// out when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    status: HealthStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<String, Value>,
}

impl HealthReport {
    pub fn status_of(status: HealthStatus) -> Self {
        Self {
            status,
            details: BTreeMap::new(),
        }
    }

    pub fn up() -> Self {
        Self::status_of(HealthStatus::Up)
    }

    pub fn down() -> Self {
        Self::status_of(HealthStatus::Down)
    }

    pub fn unknown() -> Self {
        Self::status_of(HealthStatus::Unknown)
    }

    /// Add one diagnostic entry; a repeated key replaces the earlier value
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn details(&self) -> &BTreeMap<String, Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

/// Anything that can produce a `HealthReport` on demand
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    async fn health(&self) -> HealthReport;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_status_and_details() {
        let report = HealthReport::down()
            .with_detail("error", "Row Level Security validation failed")
            .with_detail("rls_validation_failed", vec!["brands"])
            .with_detail("validation_time", 12u64);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "DOWN",
                "details": {
                    "error": "Row Level Security validation failed",
                    "rls_validation_failed": ["brands"],
                    "validation_time": 12
                }
            })
        );
    }

    #[test]
    fn omits_empty_details() {
        let value = serde_json::to_value(HealthReport::up()).unwrap();
        assert_eq!(value, json!({ "status": "UP" }));
    }

    #[test]
    fn status_codes() {
        assert_eq!(HealthStatus::Up.to_string(), "UP");
        assert_eq!(HealthStatus::Unknown.code(), "UNKNOWN");
        assert!(!HealthStatus::Unknown.is_up());
        assert!(!HealthStatus::Down.is_up());
    }

    #[test]
    fn later_detail_replaces_earlier() {
        let report = HealthReport::up()
            .with_detail("tenant_function_validated", false)
            .with_detail("tenant_function_validated", true);
        assert_eq!(report.detail("tenant_function_validated"), Some(&json!(true)));
        assert_eq!(report.details().len(), 1);
    }
}
