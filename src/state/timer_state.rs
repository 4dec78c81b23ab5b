//! Timer state structure, modes and the persisted snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three countdown modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    /// Only focus sessions are turned into time records
    pub fn is_focus(&self) -> bool {
        matches!(self, TimerMode::Focus)
    }
}

/// Minute lengths per mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Durations {
    pub fn get(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }

    /// Every mode must last at least one minute
    pub fn is_valid(&self) -> bool {
        self.focus > 0 && self.short_break > 0 && self.long_break > 0
    }

    /// Countdown length for a mode, never below one second
    pub fn total_seconds(&self, mode: TimerMode) -> u64 {
        (u64::from(self.get(mode)) * 60).max(1)
    }

    /// Apply a partial update, leaving unspecified modes untouched
    pub fn merged(&self, patch: &DurationsPatch) -> Self {
        Self {
            focus: patch.focus.unwrap_or(self.focus),
            short_break: patch.short_break.unwrap_or(self.short_break),
            long_break: patch.long_break.unwrap_or(self.long_break),
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus: 25,
            short_break: 5,
            long_break: 15,
        }
    }
}

/// Partial duration update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationsPatch {
    pub focus: Option<u32>,
    pub short_break: Option<u32>,
    pub long_break: Option<u32>,
}

/// Partial session metadata update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaPatch {
    pub activity: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Observable lifecycle state, derived from the fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Ready,
    Paused,
    Running,
}

/// Live timer state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub durations: Durations,
    pub is_running: bool,
    /// Deadline; the only source of truth for remaining time while running
    pub end_at: Option<DateTime<Utc>>,
    pub seconds_left: u64,
    pub activity: String,
    pub category: String,
    pub notes: String,
    pub widget_dismissed: bool,
    /// Outcome of the most recent save attempt, never persisted
    pub last_message: Option<String>,
}

impl TimerState {
    /// Create a ready focus timer with default durations
    pub fn new() -> Self {
        let durations = Durations::default();
        Self {
            mode: TimerMode::Focus,
            durations,
            is_running: false,
            end_at: None,
            seconds_left: durations.total_seconds(TimerMode::Focus),
            activity: String::new(),
            category: String::new(),
            notes: String::new(),
            widget_dismissed: false,
            last_message: None,
        }
    }

    /// Full countdown length of the current mode
    pub fn total_seconds(&self) -> u64 {
        self.durations.total_seconds(self.mode)
    }

    pub fn status(&self) -> TimerStatus {
        if self.is_running {
            TimerStatus::Running
        } else if self.seconds_left >= self.total_seconds() {
            TimerStatus::Ready
        } else {
            TimerStatus::Paused
        }
    }

    /// Remaining time formatted as `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.seconds_left / 60, self.seconds_left % 60)
    }

    /// Rebuild live state from a snapshot, repairing anything inconsistent
    pub fn from_snapshot(snapshot: TimerSnapshot) -> Self {
        let durations = if snapshot.durations.is_valid() {
            snapshot.durations
        } else {
            Durations::default()
        };
        let total = durations.total_seconds(snapshot.mode);

        let (is_running, end_at) = match (snapshot.is_running, snapshot.end_at) {
            (true, Some(end_at)) => (true, Some(end_at)),
            _ => (false, None),
        };

        let mut seconds_left = snapshot.seconds_left.min(total);
        if !is_running && seconds_left == 0 {
            seconds_left = total;
        }

        Self {
            mode: snapshot.mode,
            durations,
            is_running,
            end_at,
            seconds_left,
            activity: snapshot.activity,
            category: snapshot.category,
            notes: snapshot.notes,
            widget_dismissed: snapshot.widget_dismissed,
            last_message: None,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.mode,
            durations: self.durations,
            is_running: self.is_running,
            end_at: self.end_at,
            seconds_left: self.seconds_left,
            activity: self.activity.clone(),
            category: self.category.clone(),
            notes: self.notes.clone(),
            widget_dismissed: self.widget_dismissed,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized form of [`TimerState`] written after every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default)]
    pub durations: Durations,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seconds_left: u64,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub widget_dismissed: bool,
}
