//! Metric sample entity model (append-only time-series).

use lightwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single metric observation pushed by the ingestion path.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricSample {
    pub id: DbId,
    pub service: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a metric sample.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMetricSample {
    pub service: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub recorded_at: Timestamp,
}
