//! Repository for the `alert_rules` table.

use lightwatch_core::alerting::strategy::DetectionType;
use lightwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert_rule::{AlertRule, CreateAlertRule};

/// Column list for `alert_rules` queries.
const COLUMNS: &str = "\
    id, name, detection_type, metric_name, operator, threshold, lookback_duration, \
    service, enabled, channels, webhook_url, created_at, updated_at";

/// Provides read/write operations for alert rules.
pub struct AlertRuleRepo;

impl AlertRuleRepo {
    /// Insert a new rule, returning the created row.
    ///
    /// A missing or blank detection type is stored as `threshold`.
    pub async fn create(pool: &PgPool, input: &CreateAlertRule) -> Result<AlertRule, sqlx::Error> {
        let detection_type = input
            .detection_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DetectionType::default().as_str());

        let query = format!(
            "INSERT INTO alert_rules \
                (name, detection_type, metric_name, operator, threshold, lookback_duration, \
                 service, enabled, channels, webhook_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(&input.name)
            .bind(detection_type)
            .bind(&input.metric_name)
            .bind(&input.operator)
            .bind(input.threshold)
            .bind(&input.lookback_duration)
            .bind(&input.service)
            .bind(input.enabled)
            .bind(&input.channels)
            .bind(&input.webhook_url)
            .fetch_one(pool)
            .await
    }

    /// List enabled rules, optionally scoped to one service, in id order.
    pub async fn find_enabled(
        pool: &PgPool,
        service: Option<&str>,
    ) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_rules \
             WHERE enabled AND ($1::TEXT IS NULL OR service = $1) \
             ORDER BY id"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(service)
            .fetch_all(pool)
            .await
    }

    /// List every rule, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AlertRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, AlertRule>(&query).fetch_all(pool).await
    }

    /// Find a rule by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AlertRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE id = $1");
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a rule by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<AlertRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE name = $1");
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Enable or disable a rule. Returns `None` if no such rule exists.
    pub async fn set_enabled(
        pool: &PgPool,
        id: DbId,
        enabled: bool,
    ) -> Result<Option<AlertRule>, sqlx::Error> {
        let query = format!(
            "UPDATE alert_rules SET enabled = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRule>(&query)
            .bind(id)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }
}
