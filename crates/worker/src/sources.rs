//! The three capabilities the engine consumes.
//!
//! The engine only reads rules, only reads samples, and only appends
//! events. Each capability is a separate trait so tests can fake them
//! independently; [`crate::store::PgAlertStore`] implements all three on
//! PostgreSQL.

use async_trait::async_trait;
use lightwatch_core::types::{DbId, Timestamp};
use lightwatch_db::models::alert_event::CreateAlertEvent;
use lightwatch_db::models::alert_rule::AlertRule;
use lightwatch_db::models::metric_sample::MetricSample;

use crate::error::SourceError;

/// Lookup of enabled alert rules.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Enabled rules, optionally scoped to one service, in stable id order.
    async fn find_enabled_rules(
        &self,
        service: Option<&str>,
    ) -> Result<Vec<AlertRule>, SourceError>;
}

/// Lookup of recent metric samples.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Up to `limit` samples of `metric` for `service` recorded at or after
    /// `since`, newest first. An empty `service` matches every service.
    async fn find_samples(
        &self,
        service: &str,
        metric: &str,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<MetricSample>, SourceError>;
}

/// Durable, append-only storage of alert events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Persist `event` and return its identifier.
    async fn create_event(&self, event: &CreateAlertEvent) -> Result<DbId, SourceError>;
}
