//! Hand-off from the evaluation pass to notification delivery.

use lightwatch_events::{DispatchError, NotificationDispatcher, WebhookNotification};

/// Accepts breach notifications without blocking the caller.
///
/// Implementations must return promptly; delivery happens elsewhere.
pub trait BreachNotifier: Send + Sync {
    fn notify(&self, notification: WebhookNotification);
}

impl BreachNotifier for NotificationDispatcher {
    fn notify(&self, notification: WebhookNotification) {
        let rule_id = notification.rule_id;
        let event_id = notification.event_id;
        if let Err(e) = self.try_dispatch(notification) {
            match e {
                DispatchError::QueueFull => tracing::warn!(
                    rule_id,
                    event_id,
                    "Notification queue full, dropping webhook"
                ),
                DispatchError::Closed => tracing::warn!(
                    rule_id,
                    event_id,
                    "Notification dispatcher closed, dropping webhook"
                ),
            }
        }
    }
}
