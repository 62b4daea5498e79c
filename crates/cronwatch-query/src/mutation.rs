//! State-flipping operations: start and stop a schedule's job origin.
//!
//! Both return the freshly resolved schedule-or-error result so callers
//! see the state they just produced. No engine is driven here — starting
//! a schedule only marks its origin as picked up by the external daemon.

use chrono::{DateTime, Utc};
use tracing::warn;

use cronwatch_core::config::CronwatchConfig;
use cronwatch_schema::{ScheduleNotFoundError, ScheduleOrError, ScheduleSelector};
use cronwatch_store::StoreHandle;

use crate::convert::python_error_from;
use crate::error::QueryError;
use crate::resolver::resolve_schedule;

pub fn start_schedule(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &ScheduleSelector,
    now: DateTime<Utc>,
) -> ScheduleOrError {
    let row = match store.get_schedule(
        &selector.repository_location_name,
        &selector.repository_name,
        &selector.schedule_name,
    ) {
        Ok(Some(row)) => row,
        Ok(None) => return not_found(selector),
        Err(e) => return ScheduleOrError::PythonError(python_error_from(&QueryError::from(e))),
    };

    if let Err(e) = store.start_schedule(&row) {
        warn!(schedule = %selector.schedule_name, error = %e, "start failed");
        return ScheduleOrError::PythonError(python_error_from(&QueryError::from(e)));
    }
    resolve_schedule(store, config, selector, now)
}

pub fn stop_schedule(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &ScheduleSelector,
    now: DateTime<Utc>,
) -> ScheduleOrError {
    let row = match store.get_schedule(
        &selector.repository_location_name,
        &selector.repository_name,
        &selector.schedule_name,
    ) {
        Ok(Some(row)) => row,
        Ok(None) => return not_found(selector),
        Err(e) => return ScheduleOrError::PythonError(python_error_from(&QueryError::from(e))),
    };

    if let Err(e) = store.stop_schedule(&row.id) {
        warn!(schedule = %selector.schedule_name, error = %e, "stop failed");
        return ScheduleOrError::PythonError(python_error_from(&QueryError::from(e)));
    }
    resolve_schedule(store, config, selector, now)
}

fn not_found(selector: &ScheduleSelector) -> ScheduleOrError {
    ScheduleOrError::ScheduleNotFoundError(ScheduleNotFoundError {
        message: format!(
            "Schedule {} is not present in repository {} at location {}.",
            selector.schedule_name, selector.repository_name, selector.repository_location_name
        ),
    })
}
