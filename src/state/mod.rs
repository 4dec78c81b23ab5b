//! State management module
//!
//! This module contains the timer and widget data types and the shared
//! application state.

pub mod app_state;
pub mod position;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use position::{Corner, DragState, Viewport, WidgetPosition, WidgetSize};
pub use timer_state::{
    Durations, DurationsPatch, MetaPatch, TimerMode, TimerSnapshot, TimerState, TimerStatus,
};
