//! Live update feed: a cancellable periodic task that perturbs one record
//! per period.
//!
//! The first step fires one full period after `spawn`, not immediately.
//! Late ticks are delayed rather than bunched. The task holds only an
//! `Arc<Desk>`; stopping it (or dropping the handle) ends the task, so no
//! timer outlives its session.

use crate::{
    desk::Desk,
    error::{DeskError, DeskResult},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Counters returned when the feed stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStats {
    /// Timer firings.
    pub ticks: u64,
    /// Firings that changed a record. Lower than `ticks` only while the
    /// population was empty.
    pub perturbations: u64,
}

pub struct LiveFeed;

impl LiveFeed {
    /// Start the feed at the desk's configured period.
    /// Must be called from within a tokio runtime.
    pub fn spawn(desk: Arc<Desk>) -> FeedHandle {
        let period = desk.config().feed_interval();
        Self::spawn_with_period(desk, period)
    }

    pub fn spawn_with_period(desk: Arc<Desk>, period: Duration) -> FeedHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(desk, period, stop_rx));
        log::info!("feed: started, period={}ms", period.as_millis());
        FeedHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

async fn run(desk: Arc<Desk>, period: Duration, mut stop_rx: oneshot::Receiver<()>) -> FeedStats {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = FeedStats::default();

    loop {
        tokio::select! {
            biased;
            // Fires on an explicit stop and when the handle is dropped.
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                stats.ticks += 1;
                if desk.perturb_one().is_some() {
                    stats.perturbations += 1;
                }
            }
        }
    }
    stats
}

/// Owner of a running feed. Stop it explicitly with `stop`; dropping it
/// also cancels the task.
pub struct FeedHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<FeedStats>>,
}

impl FeedHandle {
    /// Signal the task and wait for it to finish.
    pub async fn stop(mut self) -> DeskResult<FeedStats> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let Some(task) = self.task.take() else {
            return Ok(FeedStats::default());
        };
        let stats = task
            .await
            .map_err(|e| DeskError::Other(anyhow::anyhow!("feed task failed: {e}")))?;
        log::info!(
            "feed: stopped after {} ticks ({} perturbations)",
            stats.ticks,
            stats.perturbations
        );
        Ok(stats)
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop_tx.take();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
