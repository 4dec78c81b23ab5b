//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    services::recorder::TaskSummary,
    state::{AppState, DurationsPatch, MetaPatch, Viewport, WidgetSize},
    timer::TimerError,
};
use super::responses::{
    DimensionsRequest, ErrorResponse, HealthResponse, ModeRequest, PointerRequest,
    PositionResponse, SnapRequest, StatusResponse, TimerResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn rejected(error: TimerError) -> ApiError {
    let status = match &error {
        TimerError::Running(_) => StatusCode::CONFLICT,
        TimerError::InvalidDuration => StatusCode::UNPROCESSABLE_ENTITY,
    };
    warn!("Rejected timer change: {}", error);
    (status, Json(ErrorResponse::new(error.to_string())))
}

fn position(state: &AppState) -> Json<PositionResponse> {
    let widget = state.widget();
    Json(PositionResponse::new(widget.position(), widget.drag_state()))
}

/// Handle GET /timer - recomputed against the deadline before answering
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    Json(state.timer.tick().await.into())
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("start");
    Json(state.timer.start().into())
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("pause");
    Json(state.timer.pause().await.into())
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("reset");
    Json(state.timer.reset().into())
}

/// Handle POST /timer/stop - stop early and save the elapsed focus time
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("stop");
    let timer = state.timer.stop_and_save().await;
    if let Some(message) = &timer.last_message {
        info!("Stop finished: {}", message);
    }
    Json(timer.into())
}

/// Handle PUT /timer/mode
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<TimerResponse>, ApiError> {
    state.record_action("mode");
    state
        .timer
        .set_mode(request.mode)
        .map(|timer| Json(TimerResponse::from(timer)))
        .map_err(rejected)
}

/// Handle PUT /timer/durations
pub async fn durations_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<DurationsPatch>,
) -> Result<Json<TimerResponse>, ApiError> {
    state.record_action("durations");
    state
        .timer
        .update_durations(&patch)
        .map(|timer| Json(TimerResponse::from(timer)))
        .map_err(rejected)
}

/// Handle PATCH /timer/meta
pub async fn meta_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<MetaPatch>,
) -> Json<TimerResponse> {
    state.record_action("meta");
    Json(state.timer.set_meta(patch).into())
}

/// Handle POST /timer/widget/dismiss
pub async fn dismiss_widget_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("dismiss-widget");
    Json(state.timer.dismiss_widget().into())
}

/// Handle POST /timer/widget/show
pub async fn show_widget_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    state.record_action("show-widget");
    Json(state.timer.show_widget().into())
}

/// Handle GET /widget/position
pub async fn position_handler(State(state): State<Arc<AppState>>) -> Json<PositionResponse> {
    position(&state)
}

/// Handle POST /widget/drag/begin
pub async fn drag_begin_handler(
    State(state): State<Arc<AppState>>,
    Json(pointer): Json<PointerRequest>,
) -> Json<PositionResponse> {
    state.widget().begin_drag(pointer.x, pointer.y);
    position(&state)
}

/// Handle POST /widget/drag/move
pub async fn drag_move_handler(
    State(state): State<Arc<AppState>>,
    Json(pointer): Json<PointerRequest>,
) -> Json<PositionResponse> {
    state.widget().drag_to(pointer.x, pointer.y);
    position(&state)
}

/// Handle POST /widget/drag/end
pub async fn drag_end_handler(State(state): State<Arc<AppState>>) -> Json<PositionResponse> {
    state.widget().end_drag();
    position(&state)
}

/// Handle POST /widget/snap
pub async fn snap_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SnapRequest>,
) -> Json<PositionResponse> {
    state.record_action("snap");
    state.widget().snap_to_corner(request.corner);
    position(&state)
}

/// Handle PUT /widget/viewport
pub async fn viewport_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DimensionsRequest>,
) -> Json<PositionResponse> {
    state.widget().resize_viewport(Viewport {
        width: request.width,
        height: request.height,
    });
    position(&state)
}

/// Handle PUT /widget/size
pub async fn widget_size_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DimensionsRequest>,
) -> Json<PositionResponse> {
    state.widget().set_widget_size(WidgetSize {
        width: request.width,
        height: request.height,
    });
    position(&state)
}

/// Handle GET /tasks - titles to pick the session activity from
pub async fn tasks_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TaskSummary>> {
    Json(state.task_list().await)
}

/// Handle GET /status - Return current status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer.tick().await.into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
