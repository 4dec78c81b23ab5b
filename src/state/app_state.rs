//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    services::recorder::{TaskDirectory, TaskSummary},
    timer::FocusTimer,
    widget::PositionManager,
};

/// Main application state shared by all handlers and background tasks
pub struct AppState {
    /// The single focus timer of this process
    pub timer: Arc<FocusTimer>,
    /// Floating widget position
    pub widget: Mutex<PositionManager>,
    /// Optional lookup of existing tasks for the activity picker
    pub tasks: Arc<dyn TaskDirectory>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        timer: Arc<FocusTimer>,
        widget: PositionManager,
        tasks: Arc<dyn TaskDirectory>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            timer,
            widget: Mutex::new(widget),
            tasks,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Lock the position manager, recovering from a poisoned lock
    pub fn widget(&self) -> MutexGuard<'_, PositionManager> {
        self.widget.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remember the most recent operation for the status endpoint
    pub fn record_action(&self, action: &str) {
        debug!("Action: {}", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Existing tasks; an unreachable task service yields an empty list
    pub async fn task_list(&self) -> Vec<TaskSummary> {
        match self.tasks.list_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("Task lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
