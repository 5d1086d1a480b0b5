//! Repository for the `metric_samples` table (append-only time-series).

use lightwatch_core::alerting::SAMPLE_FETCH_LIMIT;
use lightwatch_core::types::Timestamp;
use sqlx::PgPool;

use super::clamp_limit;
use crate::models::metric_sample::{CreateMetricSample, MetricSample};

/// Column list for `metric_samples` SELECT queries.
const COLUMNS: &str = "id, service, metric_name, value, unit, recorded_at, created_at";

/// Provides query operations for metric samples.
pub struct MetricSampleRepo;

impl MetricSampleRepo {
    /// Insert a single sample.
    pub async fn insert(
        pool: &PgPool,
        sample: &CreateMetricSample,
    ) -> Result<MetricSample, sqlx::Error> {
        let query = format!(
            "INSERT INTO metric_samples (service, metric_name, value, unit, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MetricSample>(&query)
            .bind(&sample.service)
            .bind(&sample.metric_name)
            .bind(sample.value)
            .bind(&sample.unit)
            .bind(sample.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Most recent samples of `metric_name` recorded at or after `since`,
    /// newest first.
    ///
    /// An empty `service` matches every service. `limit` is clamped to
    /// `[1, MAX_LIMIT]` and defaults to [`SAMPLE_FETCH_LIMIT`].
    pub async fn find_recent(
        pool: &PgPool,
        service: &str,
        metric_name: &str,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<MetricSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metric_samples \
             WHERE metric_name = $1 \
               AND recorded_at >= $2 \
               AND ($3 = '' OR service = $3) \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, MetricSample>(&query)
            .bind(metric_name)
            .bind(since)
            .bind(service)
            .bind(clamp_limit(limit, SAMPLE_FETCH_LIMIT))
            .fetch_all(pool)
            .await
    }
}
