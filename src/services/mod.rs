//! External service module
//!
//! This module contains the session recorder and the client for the life API
//! that stores time records and lists tasks.

pub mod life_api;
pub mod recorder;

// Re-export main types
pub use life_api::LifeApiClient;
pub use recorder::{
    build_time_record, CompletedSession, NewTimeRecord, RecordError, SaveReason, SessionRecorder,
    TaskDirectory, TaskSummary, TimeRecord, TimeRecordApi,
};
