//! Repository for the `alert_events` table.

use lightwatch_core::types::DbId;
use sqlx::PgPool;

use super::clamp_limit;
use crate::models::alert_event::{AlertEvent, CreateAlertEvent};

/// Column list for `alert_events` queries.
const COLUMNS: &str = "\
    id, rule_id, rule_name, service, value, threshold, status, \
    metric_name, operator, unit, triggered_at, resolved_at";

/// Default page size for per-rule history.
const DEFAULT_RULE_HISTORY_LIMIT: i64 = 20;

/// Default page size for the recent-events feed.
const DEFAULT_RECENT_LIMIT: i64 = 50;

/// Provides append and read operations for alert events.
pub struct AlertEventRepo;

impl AlertEventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn create(pool: &PgPool, event: &CreateAlertEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO alert_events \
                (rule_id, rule_name, service, value, threshold, status, \
                 metric_name, operator, unit, triggered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(event.rule_id)
        .bind(&event.rule_name)
        .bind(&event.service)
        .bind(event.value)
        .bind(event.threshold)
        .bind(event.status)
        .bind(&event.metadata.metric_name)
        .bind(&event.metadata.operator)
        .bind(&event.metadata.unit)
        .bind(event.triggered_at)
        .fetch_one(pool)
        .await
    }

    /// Events raised by one rule, newest first.
    pub async fn find_by_rule(
        pool: &PgPool,
        rule_id: DbId,
        limit: i64,
    ) -> Result<Vec<AlertEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_events \
             WHERE rule_id = $1 \
             ORDER BY triggered_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, AlertEvent>(&query)
            .bind(rule_id)
            .bind(clamp_limit(limit, DEFAULT_RULE_HISTORY_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Events across all rules, newest first.
    pub async fn find_recent(pool: &PgPool, limit: i64) -> Result<Vec<AlertEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_events \
             ORDER BY triggered_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, AlertEvent>(&query)
            .bind(clamp_limit(limit, DEFAULT_RECENT_LIMIT))
            .fetch_all(pool)
            .await
    }
}
