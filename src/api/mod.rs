//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/timer/mode", put(mode_handler))
        .route("/timer/durations", put(durations_handler))
        .route("/timer/meta", patch(meta_handler))
        .route("/timer/widget/dismiss", post(dismiss_widget_handler))
        .route("/timer/widget/show", post(show_widget_handler))
        .route("/widget/position", get(position_handler))
        .route("/widget/drag/begin", post(drag_begin_handler))
        .route("/widget/drag/move", post(drag_move_handler))
        .route("/widget/drag/end", post(drag_end_handler))
        .route("/widget/snap", post(snap_handler))
        .route("/widget/viewport", put(viewport_handler))
        .route("/widget/size", put(widget_size_handler))
        .route("/tasks", get(tasks_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
