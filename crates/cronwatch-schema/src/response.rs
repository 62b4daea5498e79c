use serde::{Deserialize, Serialize};

use crate::error::{PythonError, ScheduleNotFoundError, SchedulerNotDefinedError};
use crate::schedule::Schedule;

/// A configured scheduling daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduler {
    /// Implementation class name, when the daemon reports one.
    pub scheduler_class: Option<String>,
}

/// Configuration-level result: is a scheduling daemon set up at all?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum SchedulerOrError {
    SchedulerNotDefinedError(SchedulerNotDefinedError),
    Scheduler(Scheduler),
    PythonError(PythonError),
}

/// Instance-level result of looking up one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum ScheduleOrError {
    Schedule(Box<Schedule>),
    ScheduleNotFoundError(ScheduleNotFoundError),
    PythonError(PythonError),
}

/// Result of listing every schedule of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum SchedulesOrError {
    Schedules(Schedules),
    PythonError(PythonError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedules {
    pub results: Vec<Schedule>,
}

/// Response envelope of the schedule-root query: two independent results.
/// A missing scheduler daemon says nothing about whether the schedule
/// exists, and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRootQuery {
    pub scheduler: SchedulerOrError,
    pub schedule_or_error: ScheduleOrError,
}
