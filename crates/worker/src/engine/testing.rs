//! In-memory fakes of the engine's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lightwatch_core::types::{DbId, Timestamp};
use lightwatch_db::models::alert_event::CreateAlertEvent;
use lightwatch_db::models::alert_rule::AlertRule;
use lightwatch_db::models::metric_sample::MetricSample;
use lightwatch_events::WebhookNotification;

use super::AlertEngine;
use crate::error::SourceError;
use crate::notifier::BreachNotifier;
use crate::sources::{EventSink, RuleSource, SampleSource};

/// Sample lookups for this metric panic.
pub const PANIC_METRIC: &str = "explode";

pub fn rule(
    id: DbId,
    name: &str,
    metric: &str,
    operator: &str,
    threshold: f64,
    service: &str,
) -> AlertRule {
    let now = Utc::now();
    AlertRule {
        id,
        name: name.to_string(),
        detection_type: "threshold".to_string(),
        metric_name: metric.to_string(),
        operator: operator.to_string(),
        threshold,
        lookback_duration: Some("5m".to_string()),
        service: service.to_string(),
        enabled: true,
        channels: Vec::new(),
        webhook_url: None,
        created_at: now,
        updated_at: now,
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeRules {
    rules: Vec<AlertRule>,
    fail_next: AtomicBool,
    calls: AtomicUsize,
    scopes: Mutex<Vec<Option<String>>>,
    /// Simulated lookup latency, for scheduler tests.
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl FakeRules {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn with_delay(rules: Vec<AlertRule>, delay: Duration) -> Self {
        Self {
            rules,
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn rules(&self) -> Vec<AlertRule> {
        self.rules.clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn scopes(&self) -> Vec<Option<String>> {
        self.scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuleSource for FakeRules {
    async fn find_enabled_rules(
        &self,
        service: Option<&str>,
    ) -> Result<Vec<AlertRule>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scopes.lock().unwrap().push(service.map(str::to_string));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("rule store unavailable".into());
        }
        Ok(self.rules.clone())
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SampleQuery {
    pub service: String,
    pub metric: String,
    pub since: Timestamp,
    pub limit: i64,
}

#[derive(Default)]
pub struct FakeSamples {
    series: Mutex<HashMap<(String, String), Vec<f64>>>,
    failing: Mutex<Vec<(String, String)>>,
    queries: Mutex<Vec<SampleQuery>>,
}

impl FakeSamples {
    /// Store values for a series, newest first.
    pub fn push(&self, service: &str, metric: &str, values: &[f64]) {
        self.series
            .lock()
            .unwrap()
            .insert((service.to_string(), metric.to_string()), values.to_vec());
    }

    pub fn fail_for(&self, service: &str, metric: &str) {
        self.failing
            .lock()
            .unwrap()
            .push((service.to_string(), metric.to_string()));
    }

    pub fn queries(&self) -> Vec<SampleQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SampleSource for FakeSamples {
    async fn find_samples(
        &self,
        service: &str,
        metric: &str,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<MetricSample>, SourceError> {
        self.queries.lock().unwrap().push(SampleQuery {
            service: service.to_string(),
            metric: metric.to_string(),
            since,
            limit,
        });

        if metric == PANIC_METRIC {
            panic!("sample decoder exploded");
        }

        let key = (service.to_string(), metric.to_string());
        if self.failing.lock().unwrap().contains(&key) {
            return Err("sample store timed out".into());
        }

        let now = Utc::now();
        let values = self.series.lock().unwrap().get(&key).cloned().unwrap_or_default();
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, value)| MetricSample {
                id: i as DbId + 1,
                service: service.to_string(),
                metric_name: metric.to_string(),
                value,
                unit: Some("percent".to_string()),
                recorded_at: now - chrono::TimeDelta::seconds(i as i64),
                created_at: now,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeEvents {
    created: Mutex<Vec<CreateAlertEvent>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl FakeEvents {
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn created(&self) -> Vec<CreateAlertEvent> {
        self.created.lock().unwrap().clone()
    }

    pub fn last_id(&self) -> DbId {
        self.next_id.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for FakeEvents {
    async fn create_event(&self, event: &CreateAlertEvent) -> Result<DbId, SourceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("event store rejected write".into());
        }
        self.created.lock().unwrap().push(event.clone());
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<WebhookNotification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<WebhookNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl BreachNotifier for RecordingNotifier {
    fn notify(&self, notification: WebhookNotification) {
        self.sent.lock().unwrap().push(notification);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub engine: AlertEngine,
    pub rules: Arc<FakeRules>,
    pub samples: Arc<FakeSamples>,
    pub events: Arc<FakeEvents>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self::build(FakeRules::new(rules), None)
    }

    pub fn with_scope(rules: Vec<AlertRule>, scope: Option<&str>) -> Self {
        Self::build(FakeRules::new(rules), scope)
    }

    pub fn with_rule_source(rules: FakeRules) -> Self {
        Self::build(rules, None)
    }

    fn build(rules: FakeRules, scope: Option<&str>) -> Self {
        let rules = Arc::new(rules);
        let samples = Arc::new(FakeSamples::default());
        let events = Arc::new(FakeEvents::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = AlertEngine::new(
            rules.clone(),
            samples.clone(),
            events.clone(),
            notifier.clone(),
        )
        .with_rule_scope(scope.map(str::to_string));

        Self {
            engine,
            rules,
            samples,
            events,
            notifier,
        }
    }
}
