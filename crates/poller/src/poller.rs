//! Polling loop - the sole driver of engine progress

use std::time::Duration;

use contracts::{PulseSettings, StatusSource};
use pulse_engine::PulseEngine;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::stats::PollerStats;

/// Fixed-period polling loop over a status source.
///
/// The timer targets scheduled ticks rather than "now + interval", so
/// request latency does not accumulate as polling skew. Shutdown is
/// observed only between ticks, inside the retry wait, and around the
/// fetch; a pulse in progress always reaches its zero phase.
pub struct Poller<S: StatusSource> {
    source: S,
    engine: PulseEngine,
    poll_interval: Duration,
    error_wait: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<S: StatusSource> Poller<S> {
    /// Create a poller over the given source and engine.
    pub fn new(
        source: S,
        engine: PulseEngine,
        settings: &PulseSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            engine,
            poll_interval: Duration::from_secs(settings.poll_interval_seconds),
            error_wait: Duration::from_millis(settings.error_wait_retry_milliseconds),
            shutdown,
        }
    }

    /// Run until the shutdown signal is observed, then tear the engine down.
    ///
    /// Poll failures are never fatal: the loop applies the flat retry delay
    /// and keeps going. Engine step failures are logged; the next successful
    /// poll re-drives the missed steps as a catch-up run.
    #[instrument(name = "poller_run", skip(self))]
    pub async fn run(mut self) -> PollerStats {
        let started = Instant::now();
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut polls: u64 = 0;
        let mut failures: u64 = 0;
        let mut has_error = false;

        info!(
            poll_interval_s = self.poll_interval.as_secs(),
            "Polling loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.shutdown.changed() => break,
            }
            if *self.shutdown.borrow() {
                break;
            }

            if has_error {
                tokio::select! {
                    _ = time::sleep(self.error_wait) => {}
                    _ = self.shutdown.changed() => break,
                }
            }

            polls += 1;
            let report = tokio::select! {
                r = self.source.fetch() => r,
                _ = self.shutdown.changed() => break,
            };

            match report {
                Ok(status) => {
                    has_error = false;
                    observability::record_poll_success();
                    if let Err(e) = self.engine.update(&status).await {
                        // Not retried here: the gap left behind is closed by
                        // a catch-up run on the next successful poll.
                        error!(error = %e, "Engine update failed");
                    }
                }
                Err(e) => {
                    has_error = true;
                    failures += 1;
                    observability::record_poll_failure();
                    warn!(error = %e, "Poll failed");
                }
            }
        }

        info!(polls, failures, "Polling loop exiting");
        if let Err(e) = self.engine.shutdown().await {
            error!(error = %e, "Engine teardown reported an error");
        }

        PollerStats {
            polls,
            failures,
            steps: self.engine.steps_issued(),
            duration: started.elapsed(),
            final_time: self.engine.modeled_time(),
        }
    }
}
