//! Pomodoro Dock - A state-managed HTTP server for a focus timer
//!
//! This is the main entry point for the pomodoro-dock application.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodoro_dock::{
    api::create_router,
    clock::{Clock, SystemClock},
    config::Config,
    services::{LifeApiClient, SessionRecorder},
    state::AppState,
    storage::{FileStore, KeyValueStore},
    tasks::timer_tick_task,
    timer::FocusTimer,
    utils::shutdown_signal,
    widget::PositionManager,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_dock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-dock server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}, api_url={}, tick={}ms",
        config.host,
        config.port,
        config.data_dir.display(),
        config.api_url,
        config.tick_ms
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
    let api = Arc::new(LifeApiClient::new(
        config.api_url.clone(),
        config.api_token.clone(),
        config.api_timeout(),
    )?);

    // Restore the timer; a deadline that passed while we were down completes
    // here and its save runs in the background
    let recorder = SessionRecorder::new(api.clone());
    let timer = Arc::new(FocusTimer::restore(clock, store.clone(), recorder).await);
    let widget = PositionManager::load(store, config.viewport(), config.widget_size());

    let state = Arc::new(AppState::new(
        Arc::clone(&timer),
        widget,
        api,
        config.port,
        config.host.clone(),
    ));

    // Start the timer recompute background task
    let tick_interval = config.tick_interval();
    let tick_timer = Arc::clone(&timer);
    tokio::spawn(async move {
        timer_tick_task(tick_timer, tick_interval).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer                       - Current timer state");
    info!("  POST /timer/start|pause|reset|stop - Timer controls");
    info!("  PUT  /timer/mode, /timer/durations - Change mode or lengths (not while running)");
    info!("  PATCH /timer/meta                  - Activity, category, notes");
    info!("  GET  /widget/position              - Floating widget position");
    info!("  POST /widget/drag/begin|move|end   - Drag the widget");
    info!("  POST /widget/snap                  - Snap the widget to a corner");
    info!("  GET  /tasks                        - Existing task titles");
    info!("  GET  /status, /health              - Status and health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Give sessions that just finished a chance to reach the API
    let grace = config.api_timeout() + Duration::from_secs(1);
    if tokio::time::timeout(grace, timer.flush_saves()).await.is_err() {
        warn!("Gave up waiting for pending session saves");
    }

    info!("Server shutdown complete");
    Ok(())
}
