//! Shared fakes for integration tests
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use futures::future::BoxFuture;
use pomodoro_dock::{
    clock::ManualClock,
    state::TimerState,
    services::{
        NewTimeRecord, RecordError, SessionRecorder, TaskDirectory, TaskSummary, TimeRecord,
        TimeRecordApi,
    },
    storage::MemoryStore,
    timer::FocusTimer,
};

/// Collects time records instead of sending them anywhere
#[derive(Default)]
pub struct FakeRecords {
    pub created: Mutex<Vec<NewTimeRecord>>,
    pub fail: AtomicBool,
}

impl FakeRecords {
    pub fn failing() -> Self {
        let records = Self::default();
        records.fail.store(true, Ordering::SeqCst);
        records
    }

    pub fn created(&self) -> Vec<NewTimeRecord> {
        self.created.lock().unwrap().clone()
    }
}

impl TimeRecordApi for FakeRecords {
    fn create<'a>(
        &'a self,
        record: &'a NewTimeRecord,
    ) -> BoxFuture<'a, Result<TimeRecord, RecordError>> {
        Box::pin(async move {
            // Yield so that racing callers really interleave
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(RecordError::Rejected {
                    status: 400,
                    body: "invalid category".to_string(),
                });
            }
            let mut created = self.created.lock().unwrap();
            created.push(record.clone());
            Ok(TimeRecord {
                id: Some(created.len() as i64),
            })
        })
    }
}

/// Time-record API whose calls never finish
#[derive(Default)]
pub struct HangingRecords {
    pub calls: AtomicUsize,
}

impl TimeRecordApi for HangingRecords {
    fn create<'a>(
        &'a self,
        _record: &'a NewTimeRecord,
    ) -> BoxFuture<'a, Result<TimeRecord, RecordError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(futures::future::pending())
    }
}

/// Task directory returning a fixed list, or failing
pub struct FakeTasks {
    pub tasks: Vec<TaskSummary>,
    pub fail: bool,
}

impl TaskDirectory for FakeTasks {
    fn list_tasks(&self) -> BoxFuture<'_, Result<Vec<TaskSummary>, RecordError>> {
        Box::pin(async move {
            if self.fail {
                Err(RecordError::Rejected {
                    status: 503,
                    body: "down".to_string(),
                })
            } else {
                Ok(self.tasks.clone())
            }
        })
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub records: Arc<FakeRecords>,
    pub timer: Arc<FocusTimer>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_records(FakeRecords::default()).await
    }

    pub async fn with_records(records: FakeRecords) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemoryStore::new());
        let records = Arc::new(records);
        let timer = FocusTimer::restore(
            clock.clone(),
            store.clone(),
            SessionRecorder::new(records.clone()),
        )
        .await;
        Self {
            clock,
            store,
            records,
            timer: Arc::new(timer),
        }
    }

    /// Simulate a restart against the same store, clock and record sink.
    /// Waits for any save the restart started.
    pub async fn reload(&self) -> Arc<FocusTimer> {
        let timer = FocusTimer::restore(
            self.clock.clone(),
            self.store.clone(),
            SessionRecorder::new(self.records.clone()),
        )
        .await;
        timer.flush_saves().await;
        Arc::new(timer)
    }

    /// Tick and wait for a save the tick may have started
    pub async fn tick(&self) -> TimerState {
        self.timer.tick().await;
        self.timer.flush_saves().await;
        self.timer.snapshot()
    }
}
