use serde::{Deserialize, Serialize};

/// Kind of job origin a state record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Schedule,
    Sensor,
}

/// Whether a job origin is currently picked up by the scheduling daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Stopped,
}

/// Lifecycle status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineRunStatus {
    Queued,
    NotStarted,
    Managed,
    Started,
    Success,
    Failure,
    Canceling,
    Canceled,
}

/// Outcome of one evaluation instant of a job origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobTickStatus {
    Started,
    Skipped,
    Success,
    Failure,
}
