//! Countdown state machine
//!
//! Remaining time is never counted down tick by tick. While running it is
//! always `ceil((end_at - now) / 1s)`, so a late, skipped or bunched-up
//! recompute still lands on the true value. Every mutation writes a full
//! snapshot to the store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    services::recorder::{CompletedSession, SaveReason},
    state::timer_state::{Durations, MetaPatch, TimerMode, TimerSnapshot, TimerState},
    storage::{load_json, save_json, KeyValueStore, TIMER_STATE_KEY},
};

/// Message shown when a focus session is stopped before a full minute
pub const STOPPED_MESSAGE: &str = "Timer stopped";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot change {0} while the timer is running")]
    Running(&'static str),

    #[error("durations must be at least one minute")]
    InvalidDuration,
}

/// What `stop` decided about the elapsed time
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// Break mode; progress discarded
    Discarded,
    /// Less than a minute of focus; nothing to record
    TooShort,
    /// Enough focus time to record
    Save(CompletedSession),
    /// The deadline had already passed; handled as a natural completion
    Completed(Option<CompletedSession>),
}

/// Whole seconds left until `end_at`, rounded up, never negative
pub fn seconds_until(end_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (end_at - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis as u64).div_ceil(1000)
    }
}

/// Single owner of the timer state
pub struct TimerEngine {
    state: TimerState,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl TimerEngine {
    /// Create a ready engine without reading the store
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: TimerState::new(),
            clock,
            store,
        }
    }

    /// Restore from the stored snapshot, falling back to a ready focus timer.
    /// A running snapshot stays running; call [`recompute`](Self::recompute)
    /// right away to catch a deadline that passed while we were down.
    pub fn load(clock: Arc<dyn Clock>, store: Arc<dyn KeyValueStore>) -> Self {
        let state = match load_json::<TimerSnapshot>(store.as_ref(), TIMER_STATE_KEY) {
            Ok(Some(snapshot)) => {
                let state = TimerState::from_snapshot(snapshot);
                info!(
                    "Restored timer: mode={}, running={}, seconds_left={}",
                    state.mode.as_str(),
                    state.is_running,
                    state.seconds_left
                );
                state
            }
            Ok(None) => TimerState::new(),
            Err(e) => {
                warn!("Ignoring unreadable timer snapshot: {}", e);
                TimerState::new()
            }
        };

        Self {
            state,
            clock,
            store,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), TIMER_STATE_KEY, &self.state.snapshot()) {
            warn!("Failed to persist timer snapshot: {}", e);
        }
    }

    fn to_ready(&mut self) {
        self.state.is_running = false;
        self.state.end_at = None;
        self.state.seconds_left = self.state.total_seconds();
    }

    fn session(&self, minutes: f64, reason: SaveReason) -> CompletedSession {
        CompletedSession {
            activity: self.state.activity.clone(),
            category: self.state.category.clone(),
            notes: self.state.notes.clone(),
            minutes,
            reason,
        }
    }

    /// Stop at zero and hand back the focus session to record, if any.
    /// The running flag is cleared before anything is recorded, so a second
    /// recompute can never complete the same countdown again.
    fn complete(&mut self) -> Option<CompletedSession> {
        let mode = self.state.mode;
        self.to_ready();
        self.persist();
        info!("Timer finished: mode={}", mode.as_str());

        mode.is_focus().then(|| {
            self.session(f64::from(self.state.durations.focus), SaveReason::Finished)
        })
    }

    /// Start or resume the countdown
    pub fn start(&mut self) {
        if self.state.is_running {
            debug!("start ignored, already running");
            return;
        }
        if self.state.seconds_left == 0 {
            self.state.seconds_left = self.state.total_seconds();
        }

        let now = self.clock.now();
        let millis = i64::try_from(self.state.seconds_left.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.state.end_at = Some(now + Duration::milliseconds(millis));
        self.state.is_running = true;
        self.state.widget_dismissed = false;
        self.state.last_message = None;
        self.persist();
        info!(
            "Timer started: mode={}, seconds_left={}",
            self.state.mode.as_str(),
            self.state.seconds_left
        );
    }

    /// Refresh `seconds_left` from the deadline. Returns the session to
    /// record when this call is the one that completed a focus countdown.
    pub fn recompute(&mut self) -> Option<CompletedSession> {
        if !self.state.is_running {
            return None;
        }
        let Some(end_at) = self.state.end_at else {
            // Running without a deadline cannot be resumed; treat as paused
            self.state.is_running = false;
            self.persist();
            return None;
        };

        let seconds_left = self.remaining(end_at);
        if seconds_left == 0 {
            return self.complete();
        }

        if seconds_left != self.state.seconds_left || self.state.end_at != Some(end_at) {
            self.state.seconds_left = seconds_left;
            self.persist();
        }
        None
    }

    /// Seconds left against `end_at`, never above the mode total. If the wall
    /// clock stepped back past the session start, the deadline is re-anchored
    /// on the last known remaining time.
    fn remaining(&mut self, end_at: DateTime<Utc>) -> u64 {
        let now = self.clock.now();
        let total = self.state.total_seconds();
        let derived = seconds_until(end_at, now);
        if derived <= total {
            return derived;
        }

        let kept = self.state.seconds_left.min(total);
        warn!("Clock moved backwards by more than the session, keeping {}s left", kept);
        let millis = i64::try_from(kept.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.state.end_at = Some(now + Duration::milliseconds(millis));
        kept
    }

    /// Freeze the countdown. A pause that lands on the deadline completes it.
    pub fn pause(&mut self) -> Option<CompletedSession> {
        if !self.state.is_running {
            debug!("pause ignored, not running");
            return None;
        }
        if let Some(end_at) = self.state.end_at {
            self.state.seconds_left = self.remaining(end_at);
        }
        if self.state.seconds_left == 0 {
            return self.complete();
        }

        self.state.is_running = false;
        self.state.end_at = None;
        self.persist();
        info!("Timer paused at {}s", self.state.seconds_left);
        None
    }

    /// Abandon the current countdown without recording anything
    pub fn reset(&mut self) {
        self.to_ready();
        self.state.last_message = None;
        self.persist();
        info!("Timer reset: mode={}", self.state.mode.as_str());
    }

    /// End the session early, deciding whether the elapsed time is recorded
    pub fn stop(&mut self) -> StopOutcome {
        if self.state.is_running {
            if let Some(end_at) = self.state.end_at {
                self.state.seconds_left = self.remaining(end_at);
            }
            if self.state.seconds_left == 0 {
                return StopOutcome::Completed(self.complete());
            }
        }

        let mode = self.state.mode;
        let elapsed = self.state.total_seconds().saturating_sub(self.state.seconds_left);
        self.to_ready();

        let outcome = if !mode.is_focus() {
            StopOutcome::Discarded
        } else if elapsed < 60 {
            self.state.last_message = Some(STOPPED_MESSAGE.to_string());
            StopOutcome::TooShort
        } else {
            let minutes = (elapsed / 60).max(1);
            StopOutcome::Save(self.session(minutes as f64, SaveReason::Stopped))
        };

        self.persist();
        info!(
            "Timer stopped: mode={}, elapsed={}s",
            mode.as_str(),
            elapsed
        );
        outcome
    }

    pub fn set_mode(&mut self, mode: TimerMode) -> Result<(), TimerError> {
        if self.state.is_running {
            return Err(TimerError::Running("mode"));
        }
        self.state.mode = mode;
        self.state.seconds_left = self.state.total_seconds();
        self.persist();
        debug!("Mode set to {}", mode.as_str());
        Ok(())
    }

    pub fn set_durations(&mut self, durations: Durations) -> Result<(), TimerError> {
        if self.state.is_running {
            return Err(TimerError::Running("durations"));
        }
        if !durations.is_valid() {
            return Err(TimerError::InvalidDuration);
        }
        self.state.durations = durations;
        self.state.seconds_left = self.state.total_seconds();
        self.persist();
        debug!("Durations set to {:?}", durations);
        Ok(())
    }

    /// Merge any subset of the session metadata, in any state
    pub fn set_meta(&mut self, patch: MetaPatch) {
        if let Some(activity) = patch.activity {
            self.state.activity = activity;
        }
        if let Some(category) = patch.category {
            self.state.category = category;
        }
        if let Some(notes) = patch.notes {
            self.state.notes = notes;
        }
        self.persist();
    }

    pub fn dismiss_widget(&mut self) {
        self.state.widget_dismissed = true;
        self.persist();
    }

    pub fn show_widget(&mut self) {
        self.state.widget_dismissed = false;
        self.persist();
    }

    pub fn set_last_message(&mut self, message: impl Into<String>) {
        self.state.last_message = Some(message.into());
    }
}
