//! Alert event entity model and DTO.

use lightwatch_core::alerting::status::EventStatus;
use lightwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Diagnostic context captured when an event fires.
///
/// Stored as three nullable columns on `alert_events`.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AlertEventMetadata {
    pub metric_name: Option<String>,
    pub operator: Option<String>,
    pub unit: Option<String>,
}

/// A row from the `alert_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertEvent {
    pub id: DbId,
    pub rule_id: DbId,
    pub rule_name: String,
    pub service: String,
    pub value: f64,
    pub threshold: f64,
    pub status: EventStatus,
    #[sqlx(flatten)]
    pub metadata: AlertEventMetadata,
    pub triggered_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// DTO for inserting a new alert event.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAlertEvent {
    pub rule_id: DbId,
    pub rule_name: String,
    pub service: String,
    pub value: f64,
    pub threshold: f64,
    pub status: EventStatus,
    pub metadata: AlertEventMetadata,
    pub triggered_at: Timestamp,
}
