use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use pomodoro_dock::services::{
    CompletedSession, LifeApiClient, RecordError, SaveReason, SessionRecorder, TaskDirectory,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Default)]
struct Upstream {
    bodies: Mutex<Vec<Value>>,
    auth: Mutex<Option<String>>,
}

async fn create_record(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    *upstream.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if body["category"] == "Forbidden" {
        return Err((StatusCode::BAD_REQUEST, "category not allowed".to_string()));
    }
    upstream.bodies.lock().unwrap().push(body);
    Ok(Json(json!({ "id": 42, "activity": "ignored" })))
}

async fn stalled_record() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Json(json!({ "id": 1 }))
}

async fn list_tasks() -> Json<Value> {
    Json(json!([
        { "id": 1, "title": "Plan sprint", "status": "todo" },
        { "id": 2, "title": "Fix bug" }
    ]))
}

/// Serve a fake life API on an ephemeral port
async fn spawn_upstream() -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let app = Router::new()
        .route("/api/time-records/", post(create_record))
        .route("/api/tasks/", get(list_tasks))
        .route("/slow/time-records/", post(stalled_record))
        .with_state(upstream.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/", addr), upstream)
}

fn client(base_url: impl Into<String>, token: Option<&str>) -> LifeApiClient {
    LifeApiClient::new(base_url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

fn session(category: &str) -> CompletedSession {
    CompletedSession {
        activity: "Deep work".to_string(),
        category: category.to_string(),
        notes: String::new(),
        minutes: 25.0,
        reason: SaveReason::Finished,
    }
}

#[tokio::test]
async fn test_recorder_posts_time_record() {
    let (base_url, upstream) = spawn_upstream().await;
    let client = Arc::new(client(base_url, Some("secret")));
    let recorder = SessionRecorder::new(client);
    let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();

    let sent = recorder.record(&session(""), date).await.unwrap().unwrap();
    assert_eq!(sent.duration_minutes, 25);

    let bodies = upstream.bodies.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![json!({
            "activity": "Deep work",
            "category": "Focus",
            "duration_minutes": 25,
            "date": "2024-09-02",
            "description": "Completed via Pomodoro"
        })]
    );
    assert_eq!(upstream.auth.lock().unwrap().as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn test_rejected_record_is_typed_error() {
    let (base_url, upstream) = spawn_upstream().await;
    let recorder = SessionRecorder::new(Arc::new(client(base_url, None)));
    let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();

    let err = recorder.record(&session("Forbidden"), date).await.unwrap_err();
    match err {
        RecordError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "category not allowed");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(upstream.bodies.lock().unwrap().is_empty());
    assert_eq!(*upstream.auth.lock().unwrap(), None);
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    // Nothing listens on this port once the listener is dropped
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let recorder = SessionRecorder::new(Arc::new(client(format!("http://{}", addr), None)));
    let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
    let err = recorder.record(&session(""), date).await.unwrap_err();
    assert!(matches!(err, RecordError::Http(_)));
}

#[tokio::test]
async fn test_task_listing() {
    let (base_url, _) = spawn_upstream().await;
    let client = client(base_url, None);

    let tasks = client.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Plan sprint");
    assert_eq!(tasks[1].status, None);
}

#[tokio::test]
async fn test_stalled_api_times_out() {
    let (base_url, _) = spawn_upstream().await;
    let base_url = base_url.replace("/api/", "/slow/");
    let client = LifeApiClient::new(base_url, None, Duration::from_millis(200)).unwrap();
    let recorder = SessionRecorder::new(Arc::new(client));
    let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();

    let started = std::time::Instant::now();
    let err = recorder.record(&session(""), date).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    match err {
        RecordError::Http(e) => assert!(e.is_timeout(), "{}", e),
        other => panic!("unexpected error {:?}", other),
    }
}
