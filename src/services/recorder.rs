//! Session recorder: turns finished focus time into a time record

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Category used when the session has none
pub const DEFAULT_CATEGORY: &str = "Focus";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Why a session is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveReason {
    /// Countdown reached zero
    Finished,
    /// Stopped early by the user
    Stopped,
}

impl SaveReason {
    pub fn default_description(&self) -> &'static str {
        match self {
            SaveReason::Finished => "Completed via Pomodoro",
            SaveReason::Stopped => "Saved from Pomodoro",
        }
    }
}

/// Focus time waiting to be recorded, captured when the timer stops
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub activity: String,
    pub category: String,
    pub notes: String,
    pub minutes: f64,
    pub reason: SaveReason,
}

/// Body of a time-record creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTimeRecord {
    pub activity: String,
    pub category: String,
    pub duration_minutes: u32,
    pub date: NaiveDate,
    pub description: String,
}

/// Created record as returned by the server; only the id is looked at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    #[serde(default)]
    pub id: Option<i64>,
}

/// An existing task whose title can be used as the session activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Time-record creation capability
pub trait TimeRecordApi: Send + Sync {
    fn create<'a>(&'a self, record: &'a NewTimeRecord)
        -> BoxFuture<'a, Result<TimeRecord, RecordError>>;
}

/// Read-only task listing capability
pub trait TaskDirectory: Send + Sync {
    fn list_tasks(&self) -> BoxFuture<'_, Result<Vec<TaskSummary>, RecordError>>;
}

/// Build the creation request, or `None` when there is no activity name
pub fn build_time_record(session: &CompletedSession, date: NaiveDate) -> Option<NewTimeRecord> {
    let activity = session.activity.trim();
    if activity.is_empty() {
        return None;
    }

    let category = match session.category.trim() {
        "" => DEFAULT_CATEGORY,
        category => category,
    };

    let description = match session.notes.trim() {
        "" => session.reason.default_description(),
        notes => notes,
    };

    let minutes = session.minutes.round();
    let duration_minutes = if minutes.is_finite() && minutes >= 1.0 {
        minutes.min(f64::from(u32::MAX)) as u32
    } else {
        1
    };

    Some(NewTimeRecord {
        activity: activity.to_string(),
        category: category.to_string(),
        duration_minutes,
        date,
        description: description.to_string(),
    })
}

/// Sends completed focus sessions to the time-record API
#[derive(Clone)]
pub struct SessionRecorder {
    api: Arc<dyn TimeRecordApi>,
}

impl SessionRecorder {
    pub fn new(api: Arc<dyn TimeRecordApi>) -> Self {
        Self { api }
    }

    /// Record a session; `Ok(None)` means nothing was sent
    pub async fn record(
        &self,
        session: &CompletedSession,
        date: NaiveDate,
    ) -> Result<Option<NewTimeRecord>, RecordError> {
        let Some(request) = build_time_record(session, date) else {
            debug!("No activity set, skipping time record");
            return Ok(None);
        };

        let created = self.api.create(&request).await?;
        info!(
            "Recorded {} min of '{}' ({:?}, id={:?})",
            request.duration_minutes, request.activity, session.reason, created.id
        );
        Ok(Some(request))
    }
}

impl std::fmt::Debug for SessionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecorder").finish_non_exhaustive()
    }
}
