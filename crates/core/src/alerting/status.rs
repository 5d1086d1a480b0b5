//! Alert event status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an alert event.
///
/// Events are created as [`EventStatus::Firing`]. `Resolved` is part of the
/// stored schema but nothing transitions an event to it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum EventStatus {
    Firing,
    Resolved,
}

impl EventStatus {
    /// Value stored in the `alert_events.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
        }
    }
}
