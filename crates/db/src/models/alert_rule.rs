//! Alert rule entity model and DTO.

use lightwatch_core::alerting::rules::ValidatedRule;
use lightwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alert_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertRule {
    pub id: DbId,
    pub name: String,
    /// `threshold`, `rate_change` or `anomaly`.
    pub detection_type: String,
    pub metric_name: String,
    /// Comparison operator as stored (`gt`, `gte`, `lt`, `lte`, `eq`).
    pub operator: String,
    pub threshold: f64,
    /// Lookback duration string such as `"5m"`.
    pub lookback_duration: Option<String>,
    /// Empty string matches samples from any service.
    pub service: String,
    pub enabled: bool,
    pub channels: Vec<String>,
    pub webhook_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AlertRule {
    /// The webhook endpoint, if one is configured and non-blank.
    pub fn webhook_endpoint(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// DTO for inserting a new alert rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRule {
    pub name: String,
    /// Defaults to `threshold` when `None`.
    pub detection_type: Option<String>,
    pub metric_name: String,
    pub operator: String,
    pub threshold: f64,
    pub lookback_duration: Option<String>,
    pub service: String,
    pub enabled: bool,
    pub channels: Vec<String>,
    pub webhook_url: Option<String>,
}

impl From<ValidatedRule> for CreateAlertRule {
    fn from(rule: ValidatedRule) -> Self {
        Self {
            name: rule.name,
            detection_type: Some(rule.detection_type.as_str().to_string()),
            metric_name: rule.metric,
            operator: rule.operator.as_str().to_string(),
            threshold: rule.threshold,
            lookback_duration: rule.duration,
            service: rule.service,
            enabled: rule.enabled,
            channels: rule.channels,
            webhook_url: rule.webhook,
        }
    }
}
