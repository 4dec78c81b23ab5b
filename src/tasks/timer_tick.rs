//! Periodic timer recompute task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::timer::FocusTimer;

/// Recompute the timer on a fixed cadence.
///
/// The first tick fires immediately. Late or skipped ticks are harmless:
/// every recompute derives the remaining time from the absolute deadline.
pub async fn timer_tick_task(timer: Arc<FocusTimer>, period: Duration) {
    info!("Starting timer tick task (every {}ms)", period.as_millis());

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let state = timer.tick().await;
        if state.is_running {
            debug!("Tick: {}s left", state.seconds_left);
        }
    }
}
