// src/pipeline/schedule.rs

//! Fixed-interval polling.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::pipeline::{CycleOutcome, Watcher};

/// Run cycles forever, starting one every `interval`.
///
/// The first cycle starts immediately. A cycle that overruns the interval
/// delays the next one rather than triggering a burst.
pub async fn run_schedule(watcher: &Watcher, interval: Duration) {
    run_cycles(watcher, interval, None).await;
}

/// Run cycles at `interval`, stopping after `limit` cycles if given.
pub async fn run_cycles(
    watcher: &Watcher,
    interval: Duration,
    limit: Option<usize>,
) -> Vec<CycleOutcome> {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut outcomes = Vec::new();
    loop {
        ticker.tick().await;
        let outcome = watcher.run_cycle().await;

        match limit {
            Some(n) => {
                outcomes.push(outcome);
                if outcomes.len() >= n {
                    return outcomes;
                }
            }
            None => log::info!(
                "Waiting {}s before next check...",
                interval.as_secs()
            ),
        }
    }
}
