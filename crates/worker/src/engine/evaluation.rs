//! One evaluation pass over every enabled rule.

use std::any::Any;
use std::error::Error as _;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use lightwatch_core::alerting::status::EventStatus;
use lightwatch_core::alerting::strategy::{Condition, DetectionType};
use lightwatch_core::alerting::window::{resolve_lookback, Lookback};
use lightwatch_core::alerting::SAMPLE_FETCH_LIMIT;
use lightwatch_core::types::{DbId, Timestamp};
use lightwatch_db::models::alert_event::{AlertEventMetadata, CreateAlertEvent};
use lightwatch_db::models::alert_rule::AlertRule;
use lightwatch_db::models::metric_sample::MetricSample;
use lightwatch_events::{WebhookNotification, WebhookPayload};

use super::AlertEngine;
use crate::error::EngineError;

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub rules_evaluated: usize,
    pub events_created: usize,
    /// Rules whose evaluation errored or panicked.
    pub failures: usize,
    /// Rules with no samples in their window.
    pub skipped_no_data: usize,
}

/// Result of evaluating a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// No samples in the window.
    NoData,
    /// Samples present, condition not breached.
    Clear,
    /// Condition breached and the event persisted.
    Fired { event_id: DbId },
}

impl AlertEngine {
    /// Run one pass: evaluate every enabled rule in source order.
    ///
    /// Only a rule lookup failure is returned. Each rule's errors and panics
    /// are logged and counted in the summary without affecting other rules.
    pub async fn tick(&self) -> Result<PassSummary, EngineError> {
        let rules = self
            .rules
            .find_enabled_rules(self.rule_scope.as_deref())
            .await
            .map_err(EngineError::RuleSource)?;

        tracing::debug!(rule_count = rules.len(), "Evaluation pass started");

        let mut summary = PassSummary::default();
        for rule in &rules {
            summary.rules_evaluated += 1;

            match AssertUnwindSafe(self.evaluate_rule(rule)).catch_unwind().await {
                Ok(Ok(RuleOutcome::Fired { .. })) => summary.events_created += 1,
                Ok(Ok(RuleOutcome::NoData)) => summary.skipped_no_data += 1,
                Ok(Ok(RuleOutcome::Clear)) => {}
                Ok(Err(e)) => {
                    summary.failures += 1;
                    log_rule_failure(rule, &e);
                }
                Err(panic) => {
                    summary.failures += 1;
                    tracing::error!(
                        rule_id = rule.id,
                        rule_name = %rule.name,
                        panic = %panic_message(panic.as_ref()),
                        "Rule evaluation panicked"
                    );
                }
            }
        }

        tracing::debug!(
            rules_evaluated = summary.rules_evaluated,
            events_created = summary.events_created,
            failures = summary.failures,
            skipped_no_data = summary.skipped_no_data,
            "Evaluation pass finished"
        );
        Ok(summary)
    }

    /// Evaluate a single rule against the samples in its lookback window.
    pub async fn evaluate_rule(&self, rule: &AlertRule) -> Result<RuleOutcome, EngineError> {
        let now = Utc::now();

        let lookback = resolve_lookback(rule.lookback_duration.as_deref());
        if let Lookback::Fallback(e) = &lookback {
            tracing::debug!(
                rule_id = rule.id,
                error = %e,
                "Unusable lookback duration, using default window"
            );
        }
        let since = window_start(now, lookback.window());

        let samples = self
            .samples
            .find_samples(&rule.service, &rule.metric_name, since, SAMPLE_FETCH_LIMIT)
            .await
            .map_err(EngineError::SampleSource)?;

        if samples.is_empty() {
            return Ok(RuleOutcome::NoData);
        }

        let Some(strategy) = detection_strategy(rule) else {
            return Ok(RuleOutcome::Clear);
        };

        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let condition = Condition {
            operator: &rule.operator,
            threshold: rule.threshold,
        };
        let Some(breach) = strategy.evaluate(&condition, &values) else {
            return Ok(RuleOutcome::Clear);
        };
        let Some(sample) = samples.get(breach.sample_index) else {
            return Ok(RuleOutcome::Clear);
        };

        let event = build_event(rule, sample, breach.value, now);
        let event_id = self
            .events
            .create_event(&event)
            .await
            .map_err(EngineError::Persistence)?;

        tracing::warn!(
            event_id,
            rule_id = rule.id,
            rule_name = %rule.name,
            service = %rule.service,
            value = event.value,
            threshold = event.threshold,
            "Alert triggered"
        );

        if let Some(url) = rule.webhook_endpoint() {
            self.notifier.notify(WebhookNotification {
                rule_id: rule.id,
                event_id,
                url: url.to_string(),
                payload: WebhookPayload::from(&event),
            });
        }

        Ok(RuleOutcome::Fired { event_id })
    }
}

/// Start of the lookback window ending at `now`.
fn window_start(now: Timestamp, window: Duration) -> Timestamp {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The strategy named on the rule, or `None` if the name is unknown.
fn detection_strategy(rule: &AlertRule) -> Option<DetectionType> {
    match rule.detection_type.parse::<DetectionType>() {
        Ok(strategy) => {
            if !strategy.is_implemented() {
                tracing::debug!(
                    rule_id = rule.id,
                    detection_type = %strategy,
                    "Detection type not implemented, rule cannot fire"
                );
            }
            Some(strategy)
        }
        Err(e) => {
            tracing::debug!(rule_id = rule.id, error = %e, "Unknown detection type, skipping");
            None
        }
    }
}

fn build_event(
    rule: &AlertRule,
    sample: &MetricSample,
    value: f64,
    triggered_at: Timestamp,
) -> CreateAlertEvent {
    CreateAlertEvent {
        rule_id: rule.id,
        rule_name: rule.name.clone(),
        service: rule.service.clone(),
        value,
        threshold: rule.threshold,
        status: EventStatus::Firing,
        metadata: AlertEventMetadata {
            metric_name: Some(rule.metric_name.clone()),
            operator: Some(rule.operator.clone()),
            unit: sample.unit.clone(),
        },
        triggered_at,
    }
}

fn log_rule_failure(rule: &AlertRule, error: &EngineError) {
    match error {
        EngineError::Persistence(source) => tracing::error!(
            rule_id = rule.id,
            rule_name = %rule.name,
            error = %source,
            "Failed to persist alert event"
        ),
        other => tracing::warn!(
            rule_id = rule.id,
            rule_name = %rule.name,
            metric = %rule.metric_name,
            error = %other,
            cause = other.source().map(ToString::to_string),
            "Rule evaluation failed, skipping rule"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
