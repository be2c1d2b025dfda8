//! Periodic refresh.
//!
//! # Responsibilities
//! - Run `refresh_all()` on a fixed interval once connected
//! - Let ticks overlap: each tick is its own task, nothing waits for the last one
//! - Abort every in-flight tick on teardown
//!
//! No backoff, no jitter. A failed read is simply retried by the next tick.

use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::controller::session::SessionError;
use crate::controller::SessionController;

impl SessionController {
    /// Start the poll loop. Requires a connected session; calling it again
    /// while a loop is running is a no-op.
    pub fn start_polling(self: &Arc<Self>) -> Result<(), SessionError> {
        if self.is_torn_down() {
            return Err(SessionError::Closed);
        }
        self.session().require_active()?;

        let mut tasks = self.tasks();
        if tasks.poller.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let period = self.settings().poll_interval;
        let controller = Arc::downgrade(self);
        tasks.poller = Some(tokio::spawn(poll_loop(controller, period)));

        tracing::info!(interval_ms = period.as_millis() as u64, "Polling started");
        Ok(())
    }

    /// Connect, poll until `shutdown` fires, then tear down.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> Result<(), SessionError> {
        self.connect().await?;
        self.start_polling()?;

        let _ = shutdown.recv().await;
        tracing::info!("Controller received shutdown signal");
        self.teardown();
        Ok(())
    }
}

async fn poll_loop(controller: Weak<SessionController>, period: time::Duration) {
    // connect() already refreshed, so the first tick is one period out
    let mut ticker = time::interval_at(Instant::now() + period, period);
    // Dropping the set on abort cancels every in-flight tick with it
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(controller) = controller.upgrade() else {
                    tracing::debug!("Controller dropped, stopping poll loop");
                    break;
                };
                if controller.is_torn_down() {
                    break;
                }
                in_flight.spawn(async move {
                    controller.refresh_all().await;
                });
            }
            Some(result) = in_flight.join_next() => {
                if let Err(e) = result {
                    if e.is_panic() {
                        tracing::error!(error = %e, "Refresh task panicked");
                    }
                }
            }
        }
    }
}
