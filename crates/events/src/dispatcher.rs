//! Bounded, drainable notification dispatch.
//!
//! The evaluation pass hands notifications to [`NotificationDispatcher`]
//! and moves on. A single consumer task pulls from a bounded queue and
//! runs each delivery as its own task, with at most `max_in_flight`
//! deliveries outstanding. On shutdown the queue is closed to new work,
//! everything already queued is delivered, and all in-flight deliveries
//! are joined.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::delivery::webhook::{WebhookDelivery, WebhookNotification};

/// Default number of notifications that may wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default cap on concurrent webhook deliveries.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Why a notification was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification queue is full")]
    QueueFull,

    #[error("notification dispatcher is shut down")]
    Closed,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Sizing for the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub queue_capacity: usize,
    pub max_in_flight: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

/// Cheap, cloneable sending side of the dispatcher.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<WebhookNotification>,
}

/// Owner-side handle used to shut the dispatcher down.
#[derive(Debug)]
pub struct DispatcherHandle {
    shutdown: CancellationToken,
    join: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Spawn the consumer task and return the sending side plus its handle.
    ///
    /// Zero values in `config` are raised to 1.
    pub fn spawn(
        delivery: Arc<WebhookDelivery>,
        config: DispatcherConfig,
    ) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let shutdown = CancellationToken::new();
        let join = tokio::spawn(run_consumer(
            rx,
            delivery,
            config.max_in_flight.max(1),
            shutdown.clone(),
        ));

        (Self { tx }, DispatcherHandle { shutdown, join })
    }

    /// Queue a notification without waiting.
    pub fn try_dispatch(&self, notification: WebhookNotification) -> Result<(), DispatchError> {
        self.tx.try_send(notification).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}

impl DispatcherHandle {
    /// Stop accepting notifications and wait for queued and in-flight
    /// deliveries to finish.
    ///
    /// Returns `false` if `timeout` elapsed first; outstanding deliveries
    /// are then abandoned.
    pub async fn drain(self, timeout: Duration) -> bool {
        self.shutdown.cancel();
        match tokio::time::timeout(timeout, self.join).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Notification dispatcher task failed");
                true
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Notification drain timed out, abandoning outstanding deliveries"
                );
                false
            }
        }
    }
}

/// Consumer loop: pull notifications, run them under the in-flight cap,
/// then drain on shutdown.
async fn run_consumer(
    mut rx: mpsc::Receiver<WebhookNotification>,
    delivery: Arc<WebhookDelivery>,
    max_in_flight: usize,
    shutdown: CancellationToken,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight));
    let mut in_flight = JoinSet::new();
    let mut closing = false;

    tracing::debug!(max_in_flight, "Notification dispatcher started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled(), if !closing => {
                // Refuse new sends; buffered notifications are still received.
                rx.close();
                closing = true;
                tracing::info!(queued = rx.len(), "Notification dispatcher draining");
            }
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_join_result(result);
            }
            next = rx.recv() => {
                let Some(notification) = next else { break };
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break;
                };
                let delivery = Arc::clone(&delivery);
                in_flight.spawn(async move {
                    let _permit = permit;
                    // Outcome is logged inside `deliver`.
                    let _ = delivery.deliver(&notification).await;
                });
            }
        }
    }

    while let Some(result) = in_flight.join_next().await {
        log_join_result(result);
    }

    tracing::info!("Notification dispatcher stopped");
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Webhook delivery task panicked");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
