//! PostgreSQL-backed implementation of the engine's sources.

use async_trait::async_trait;
use lightwatch_core::types::{DbId, Timestamp};
use lightwatch_db::models::alert_event::CreateAlertEvent;
use lightwatch_db::models::alert_rule::AlertRule;
use lightwatch_db::models::metric_sample::MetricSample;
use lightwatch_db::repositories::{AlertEventRepo, AlertRuleRepo, MetricSampleRepo};
use lightwatch_db::DbPool;

use crate::error::SourceError;
use crate::sources::{EventSink, RuleSource, SampleSource};

/// Delegates each capability to the matching repository.
#[derive(Clone)]
pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleSource for PgAlertStore {
    async fn find_enabled_rules(
        &self,
        service: Option<&str>,
    ) -> Result<Vec<AlertRule>, SourceError> {
        Ok(AlertRuleRepo::find_enabled(&self.pool, service).await?)
    }
}

#[async_trait]
impl SampleSource for PgAlertStore {
    async fn find_samples(
        &self,
        service: &str,
        metric: &str,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<MetricSample>, SourceError> {
        Ok(MetricSampleRepo::find_recent(&self.pool, service, metric, since, limit).await?)
    }
}

#[async_trait]
impl EventSink for PgAlertStore {
    async fn create_event(&self, event: &CreateAlertEvent) -> Result<DbId, SourceError> {
        Ok(AlertEventRepo::create(&self.pool, event).await?)
    }
}
