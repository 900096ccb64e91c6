//! Periodic task scheduling.
//!
//! A [`Schedule`] runs a task immediately and then once per period, strictly
//! serially: the next run starts only after the previous one completed and
//! the ticker fired. A run that overruns the period is followed at once by
//! the next run; runs never overlap and missed ticks are not replayed.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    period: Duration,
    immediate: bool,
}

impl Schedule {
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            immediate: true,
        }
    }

    /// Wait one full period before the first run.
    pub fn delayed(mut self) -> Self {
        self.immediate = false;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drive `task` until `shutdown` fires. An in-flight run is cancelled on shutdown.
    pub async fn run<F, Fut>(&self, mut task: F, mut shutdown: broadcast::Receiver<()>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let start = if self.immediate {
            Instant::now()
        } else {
            Instant::now() + self.period
        };
        let mut ticker = time::interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => break,
            }
            tokio::select! {
                _ = task() => {}
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!(period = ?self.period, "Schedule stopped");
    }
}
