//! Periodic pass driver.
//!
//! The loop checks its cancellation token before every wait and runs each
//! pass to completion inside the select arm, so cancellation is observed
//! only between passes. Passes never overlap; ticks missed while a pass
//! runs are skipped rather than replayed.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::AlertEngine;

/// Shortest accepted pass interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running engine loop.
#[derive(Debug)]
pub struct EngineHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl EngineHandle {
    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request a stop and wait for the in-flight pass, if any, to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Alert engine task failed");
        }
    }
}

impl AlertEngine {
    /// Spawn [`AlertEngine::run`] on the runtime.
    pub fn start(self, interval: Duration) -> EngineHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let join = tokio::spawn(async move { self.run(interval, token).await });
        EngineHandle { cancel, join }
    }

    /// Run passes every `interval` until `cancel` fires.
    ///
    /// The first pass runs immediately. Rule lookup failures are logged
    /// and retried on the next tick.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let interval = interval.max(MIN_INTERVAL);
        tracing::info!(interval_secs = interval.as_secs(), "Alert engine started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        let cause = std::error::Error::source(&e)
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        tracing::error!(error = %e, cause = %cause, "Evaluation pass failed");
                    }
                }
            }
        }

        tracing::info!("Alert engine stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
