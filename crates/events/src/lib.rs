//! Lightwatch alert notification delivery.
//!
//! - [`delivery::webhook`] -- the outbound webhook payload and a
//!   single-attempt HTTP client.
//! - [`NotificationDispatcher`] -- bounded queue plus a capped pool of
//!   in-flight deliveries, drained on shutdown.

pub mod delivery;
pub mod dispatcher;

pub use delivery::webhook::{WebhookDelivery, WebhookError, WebhookNotification, WebhookPayload};
pub use dispatcher::{DispatchError, DispatcherConfig, DispatcherHandle, NotificationDispatcher};
