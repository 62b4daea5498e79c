use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use cronwatch_schema::{
    RepositorySelector, ScheduleOrError, ScheduleRootQuery, ScheduleRootQueryVariables,
    ScheduleSelector, SchedulesOrError,
};

use crate::app::AppState;

/// POST /query/schedule-root — the schedule-root query operation.
///
/// Always 200: lookup misses and internal failures come back as tagged
/// variants in the envelope, not as HTTP errors.
pub async fn schedule_root_handler(
    State(state): State<Arc<AppState>>,
    Json(vars): Json<ScheduleRootQueryVariables>,
) -> Json<ScheduleRootQuery> {
    Json(cronwatch_query::resolve_schedule_root(
        &state.store,
        &state.config,
        &vars.schedule_selector,
        Utc::now(),
    ))
}

/// GET /schedules — every schedule of one repository, fully resolved.
pub async fn list_schedules_handler(
    State(state): State<Arc<AppState>>,
    Query(selector): Query<RepositorySelector>,
) -> Json<SchedulesOrError> {
    Json(cronwatch_query::resolve_schedules(
        &state.store,
        &state.config,
        &selector,
        Utc::now(),
    ))
}

/// POST /schedules/start — mark a schedule as picked up by the daemon.
pub async fn start_schedule_handler(
    State(state): State<Arc<AppState>>,
    Json(selector): Json<ScheduleSelector>,
) -> Json<ScheduleOrError> {
    Json(cronwatch_query::start_schedule(
        &state.store,
        &state.config,
        &selector,
        Utc::now(),
    ))
}

/// POST /schedules/stop — mark a schedule as stopped.
pub async fn stop_schedule_handler(
    State(state): State<Arc<AppState>>,
    Json(selector): Json<ScheduleSelector>,
) -> Json<ScheduleOrError> {
    Json(cronwatch_query::stop_schedule(
        &state.store,
        &state.config,
        &selector,
        Utc::now(),
    ))
}
