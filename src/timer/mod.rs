//! Focus timer module
//!
//! The engine is a synchronous state machine; the controller wraps it for
//! shared use and performs the asynchronous session recording.

pub mod controller;
pub mod engine;

// Re-export main types
pub use controller::FocusTimer;
pub use engine::{seconds_until, StopOutcome, TimerEngine, TimerError};
