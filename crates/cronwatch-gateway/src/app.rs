use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use cronwatch_core::config::CronwatchConfig;
use cronwatch_store::StoreHandle;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: CronwatchConfig,
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(config: CronwatchConfig, store: StoreHandle) -> Self {
        Self { config, store }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/query/schedule-root",
            post(crate::http::schedule::schedule_root_handler),
        )
        .route(
            "/schedules",
            get(crate::http::schedule::list_schedules_handler),
        )
        .route(
            "/schedules/start",
            post(crate::http::schedule::start_schedule_handler),
        )
        .route(
            "/schedules/stop",
            post(crate::http::schedule::stop_schedule_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
