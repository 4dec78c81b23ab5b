//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{
    Corner, DragState, Durations, TimerMode, TimerState, TimerStatus, WidgetPosition,
};

/// Timer state as seen by the floating widget and the full panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub mode: TimerMode,
    pub durations: Durations,
    pub is_running: bool,
    pub end_at: Option<DateTime<Utc>>,
    pub seconds_left: u64,
    pub total_seconds: u64,
    pub status: TimerStatus,
    pub display: String,
    pub activity: String,
    pub category: String,
    pub notes: String,
    pub widget_dismissed: bool,
    pub last_message: Option<String>,
}

impl From<TimerState> for TimerResponse {
    fn from(state: TimerState) -> Self {
        Self {
            total_seconds: state.total_seconds(),
            status: state.status(),
            display: state.display(),
            mode: state.mode,
            durations: state.durations,
            is_running: state.is_running,
            end_at: state.end_at,
            seconds_left: state.seconds_left,
            activity: state.activity,
            category: state.category,
            notes: state.notes,
            widget_dismissed: state.widget_dismissed,
            last_message: state.last_message,
        }
    }
}

/// Widget position plus whether a drag is in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionResponse {
    pub x: f64,
    pub y: f64,
    pub dragging: bool,
}

impl PositionResponse {
    pub fn new(position: WidgetPosition, drag: DragState) -> Self {
        Self {
            x: position.x,
            y: position.y,
            dragging: drag.is_dragging(),
        }
    }
}

/// Error body for rejected operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: TimerMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnapRequest {
    pub corner: Corner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimensionsRequest {
    pub width: f64,
    pub height: f64,
}

/// Status response with timer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerResponse,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
