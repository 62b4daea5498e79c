use serde::{Deserialize, Serialize};

use crate::enums::{JobStatus, JobTickStatus, JobType, PipelineRunStatus};
use crate::error::PythonError;

/// Persistent state of one job origin: its recent runs, recent ticks, and
/// aggregate counts. Absent from a schedule snapshot until the schedule has
/// been started at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub id: String,
    pub name: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub repository_origin: RepositoryOrigin,
    pub job_specific_data: Option<JobSpecificData>,
    /// Recent runs, newest first.
    pub runs: Vec<PipelineRun>,
    /// Total number of runs ever launched for this origin.
    pub runs_count: i64,
    /// Recent ticks, newest first.
    pub ticks: Vec<JobTick>,
    /// Number of runs currently in progress.
    pub running_count: i64,
}

/// Where a job's repository lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryOrigin {
    pub repository_location_name: String,
    pub repository_name: String,
    /// Ordered key/value pairs describing the location.
    pub repository_location_metadata: Vec<RepositoryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub key: String,
    pub value: String,
}

/// Data specific to the kind of job origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum JobSpecificData {
    SensorJobData(SensorJobData),
    ScheduleJobData(ScheduleJobData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorJobData {
    pub last_run_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleJobData {
    pub cron_schedule: String,
}

/// A run as embedded in a job state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: String,
    pub run_id: String,
    pub pipeline_name: String,
    pub status: PipelineRunStatus,
    /// Ordered key/value tags attached to the run.
    pub tags: Vec<PipelineTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTag {
    pub key: String,
    pub value: String,
}

/// One evaluation instant of a job origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTick {
    pub id: String,
    pub status: JobTickStatus,
    /// Epoch seconds of the evaluation instant.
    pub timestamp: f64,
    /// Runs this tick launched, in the order the tick recorded them.
    pub runs: Vec<TickRun>,
    /// Populated when the tick failed.
    pub error: Option<PythonError>,
}

/// The brief run shape embedded in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRun {
    pub id: String,
    pub run_id: String,
    pub status: PipelineRunStatus,
}
