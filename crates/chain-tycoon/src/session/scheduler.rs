use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinHandle},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use super::SessionError;

/// Default time between two ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(4000);

/// Sends one message into a queue every `period`, until stopped.
///
/// The first message is sent one full period after [`TickScheduler::start`].
/// Dropping a running scheduler aborts its task.
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<u64>>,
}

impl TickScheduler {
    /// Spawns the timer task. Must be called from within a Tokio runtime.
    pub fn start<T, F>(
        period: Duration,
        queue: mpsc::Sender<T>,
        mut make: F,
    ) -> Result<Self, SessionError>
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        if period.is_zero() {
            return Err(SessionError::ZeroTickInterval);
        }

        let (shutdown, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut fired = 0;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if queue.send(make()).await.is_err() {
                            debug!("tick queue closed");
                            break;
                        }
                        fired += 1;
                    }
                    // Also resolves when the sender is dropped.
                    _ = stopped.changed() => break,
                }
            }

            fired
        });

        info!(?period, "tick scheduler started");

        Ok(TickScheduler {
            period,
            shutdown,
            handle: Some(handle),
        })
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops the timer and returns how many ticks it sent.
    pub async fn stop(mut self) -> Result<u64, JoinError> {
        // The task may already have exited on a closed queue.
        let _ = self.shutdown.send(true);

        let fired = match self.handle.take() {
            Some(handle) => handle.await?,
            None => 0,
        };
        info!(fired, "tick scheduler stopped");

        Ok(fired)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
