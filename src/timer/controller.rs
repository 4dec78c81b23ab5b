//! Shared handle around the engine that also records finished sessions

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::engine::{StopOutcome, TimerEngine, TimerError};
use crate::{
    clock::Clock,
    services::recorder::{CompletedSession, SaveReason, SessionRecorder},
    state::timer_state::{Durations, DurationsPatch, MetaPatch, TimerMode, TimerState},
    storage::KeyValueStore,
};

/// Application-level focus timer: one per process, passed around in an `Arc`.
///
/// Engine transitions happen under a short lock. A finished session is
/// recorded on its own task, spawned after the lock is released and the timer
/// already reads as stopped. Concurrent ticks or requests never save the same
/// session twice, and a slow save never holds up the next recompute.
pub struct FocusTimer {
    engine: Arc<Mutex<TimerEngine>>,
    recorder: SessionRecorder,
    clock: Arc<dyn Clock>,
    saves: Mutex<Vec<JoinHandle<()>>>,
}

impl FocusTimer {
    pub fn new(engine: TimerEngine, recorder: SessionRecorder, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            recorder,
            clock,
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Load the stored snapshot and settle it against the current time.
    /// A session completed here is saved in the background.
    pub async fn restore(
        clock: Arc<dyn Clock>,
        store: Arc<dyn KeyValueStore>,
        recorder: SessionRecorder,
    ) -> Self {
        let engine = TimerEngine::load(clock.clone(), store);
        let timer = Self::new(engine, recorder, clock);
        timer.tick().await;
        timer
    }

    fn engine(&self) -> MutexGuard<'_, TimerEngine> {
        lock(&self.engine)
    }

    /// Current state, as last recomputed
    pub fn snapshot(&self) -> TimerState {
        self.engine().state().clone()
    }

    /// Recompute from the deadline. If this completed a focus session, its
    /// save is started in the background and this returns right away.
    pub async fn tick(&self) -> TimerState {
        let completed = self.engine().recompute();
        if let Some(session) = completed {
            self.save_in_background(session);
        }
        self.snapshot()
    }

    pub fn start(&self) -> TimerState {
        let mut engine = self.engine();
        engine.start();
        engine.state().clone()
    }

    pub async fn pause(&self) -> TimerState {
        let completed = self.engine().pause();
        if let Some(session) = completed {
            self.save_in_background(session);
        }
        self.snapshot()
    }

    pub fn reset(&self) -> TimerState {
        let mut engine = self.engine();
        engine.reset();
        engine.state().clone()
    }

    /// End the session early and record the elapsed focus time if long enough.
    /// Waits for the save so the caller sees its outcome in `last_message`.
    pub async fn stop_and_save(&self) -> TimerState {
        let outcome = self.engine().stop();
        match outcome {
            StopOutcome::Save(session) | StopOutcome::Completed(Some(session)) => {
                let save = self.spawn_record(session);
                if let Err(e) = save.await {
                    warn!("Session save task failed: {}", e);
                }
            }
            StopOutcome::Discarded | StopOutcome::TooShort | StopOutcome::Completed(None) => {}
        }
        self.snapshot()
    }

    /// Wait for every background save started so far
    pub async fn flush_saves(&self) {
        let pending: Vec<_> = {
            let mut saves = self.saves.lock().unwrap_or_else(|e| e.into_inner());
            saves.drain(..).collect()
        };
        for save in pending {
            if let Err(e) = save.await {
                warn!("Session save task failed: {}", e);
            }
        }
    }

    pub fn set_mode(&self, mode: TimerMode) -> Result<TimerState, TimerError> {
        let mut engine = self.engine();
        engine.set_mode(mode)?;
        Ok(engine.state().clone())
    }

    pub fn set_durations(&self, durations: Durations) -> Result<TimerState, TimerError> {
        let mut engine = self.engine();
        engine.set_durations(durations)?;
        Ok(engine.state().clone())
    }

    /// Apply a partial duration update on top of the current durations
    pub fn update_durations(&self, patch: &DurationsPatch) -> Result<TimerState, TimerError> {
        let mut engine = self.engine();
        let durations = engine.state().durations.merged(patch);
        engine.set_durations(durations)?;
        Ok(engine.state().clone())
    }

    pub fn set_meta(&self, patch: MetaPatch) -> TimerState {
        let mut engine = self.engine();
        engine.set_meta(patch);
        engine.state().clone()
    }

    pub fn dismiss_widget(&self) -> TimerState {
        let mut engine = self.engine();
        engine.dismiss_widget();
        engine.state().clone()
    }

    pub fn show_widget(&self) -> TimerState {
        let mut engine = self.engine();
        engine.show_widget();
        engine.state().clone()
    }

    fn save_in_background(&self, session: CompletedSession) {
        let save = self.spawn_record(session);
        let mut saves = self.saves.lock().unwrap_or_else(|e| e.into_inner());
        saves.retain(|handle| !handle.is_finished());
        saves.push(save);
    }

    /// Record on a separate task. Only `last_message` is touched afterwards.
    fn spawn_record(&self, session: CompletedSession) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let recorder = self.recorder.clone();
        let today = self.clock.today();

        tokio::spawn(async move {
            let message = match recorder.record(&session, today).await {
                Ok(Some(record)) => match session.reason {
                    SaveReason::Finished => format!("Saved {} min focus session", record.duration_minutes),
                    SaveReason::Stopped => format!("Saved {} min (stopped early)", record.duration_minutes),
                },
                Ok(None) => {
                    info!("Focus session ended without an activity, nothing saved");
                    "Session not saved: no activity set".to_string()
                }
                Err(e) => {
                    warn!("Failed to save focus session: {}", e);
                    format!("Could not save session: {}", e)
                }
            };
            lock(&engine).set_last_message(message);
        })
    }
}

fn lock(engine: &Mutex<TimerEngine>) -> MutexGuard<'_, TimerEngine> {
    engine.lock().unwrap_or_else(|e| e.into_inner())
}
