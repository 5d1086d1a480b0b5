//! Rule definition validation.
//!
//! [`RuleDefinition`] is the shape in which rules arrive from outside the
//! engine (seed files, admin tooling). [`RuleDefinition::validate_rule`]
//! enforces the persisted-rule invariants: non-empty metric and operator,
//! a known operator, and a detection type that defaults to `threshold`.

use serde::Deserialize;
use validator::Validate;

use crate::alerting::condition::CompareOp;
use crate::alerting::strategy::DetectionType;
use crate::channels::is_known_channel;
use crate::error::CoreError;

/// A rule definition as supplied by an operator.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RuleDefinition {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,

    /// Detection strategy name; `threshold` when omitted.
    #[serde(default, rename = "type")]
    pub detection_type: Option<String>,

    #[validate(nested)]
    pub condition: ConditionDefinition,

    /// Target service. Empty matches samples from any service.
    #[serde(default)]
    pub service: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub channels: Vec<String>,

    #[validate(url(message = "webhook must be a valid URL"))]
    #[serde(default)]
    pub webhook: Option<String>,
}

/// The condition part of a [`RuleDefinition`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConditionDefinition {
    #[validate(length(min = 1, message = "metric must not be empty"))]
    pub metric: String,

    #[validate(length(min = 1, message = "operator must not be empty"))]
    pub operator: String,

    pub threshold: f64,

    /// Lookback duration string such as `"5m"`.
    #[serde(default)]
    pub duration: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// A rule definition that passed validation, with defaults applied.
#[derive(Debug, Clone)]
pub struct ValidatedRule {
    pub name: String,
    pub detection_type: DetectionType,
    pub metric: String,
    pub operator: CompareOp,
    pub threshold: f64,
    pub duration: Option<String>,
    pub service: String,
    pub enabled: bool,
    pub channels: Vec<String>,
    pub webhook: Option<String>,
}

impl RuleDefinition {
    /// Validate the definition and apply defaults.
    ///
    /// Blank optional strings (`type`, `duration`, `webhook`) are treated
    /// as absent.
    pub fn validate_rule(mut self) -> Result<ValidatedRule, CoreError> {
        self.webhook = non_blank(self.webhook.take());
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be blank".to_string()));
        }
        if !self.condition.threshold.is_finite() {
            return Err(CoreError::Validation(
                "threshold must be a finite number".to_string(),
            ));
        }

        let operator: CompareOp = self.condition.operator.parse()?;

        let detection_type = match non_blank(self.detection_type) {
            Some(name) => name.parse()?,
            None => DetectionType::default(),
        };

        if let Some(unknown) = self.channels.iter().find(|c| !is_known_channel(c)) {
            return Err(CoreError::Validation(format!(
                "unknown notification channel '{unknown}'"
            )));
        }

        let webhook = self.webhook;
        if let Some(url) = &webhook {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Validation(format!(
                    "webhook must use http or https: {url}"
                )));
            }
        }

        Ok(ValidatedRule {
            name: self.name.trim().to_string(),
            detection_type,
            metric: self.condition.metric,
            operator,
            threshold: self.condition.threshold,
            duration: non_blank(self.condition.duration),
            service: self.service,
            enabled: self.enabled,
            channels: self.channels,
            webhook,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
