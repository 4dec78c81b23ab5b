//! Pomodoro Dock - A state-managed HTTP server for a focus timer
//!
//! This library provides a drift-resistant countdown engine that survives
//! restarts, records finished focus sessions as time records exactly once,
//! and manages the position of the floating timer widget.

pub mod api;
pub mod clock;
pub mod config;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod timer;
pub mod utils;
pub mod widget;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use state::AppState;
pub use timer::FocusTimer;
pub use utils::signals::shutdown_signal;
pub use widget::PositionManager;
