use serde::{Deserialize, Serialize};

/// Whether a job origin is actively picked up by the scheduling daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRowStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for JobRowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobRowStatus::Running => "running",
            JobRowStatus::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JobRowStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(JobRowStatus::Running),
            "stopped" => Ok(JobRowStatus::Stopped),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// Kind of job origin a state record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRowType {
    Schedule,
    Sensor,
}

impl std::fmt::Display for JobRowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobRowType::Schedule => "schedule",
            JobRowType::Sensor => "sensor",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JobRowType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "schedule" => Ok(JobRowType::Schedule),
            "sensor" => Ok(JobRowType::Sensor),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Lifecycle state of a recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRowStatus {
    Queued,
    NotStarted,
    Managed,
    Started,
    Success,
    Failure,
    Canceling,
    Canceled,
}

impl std::fmt::Display for RunRowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunRowStatus::Queued => "queued",
            RunRowStatus::NotStarted => "not_started",
            RunRowStatus::Managed => "managed",
            RunRowStatus::Started => "started",
            RunRowStatus::Success => "success",
            RunRowStatus::Failure => "failure",
            RunRowStatus::Canceling => "canceling",
            RunRowStatus::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RunRowStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "queued" => Ok(RunRowStatus::Queued),
            "not_started" => Ok(RunRowStatus::NotStarted),
            "managed" => Ok(RunRowStatus::Managed),
            "started" => Ok(RunRowStatus::Started),
            "success" => Ok(RunRowStatus::Success),
            "failure" => Ok(RunRowStatus::Failure),
            "canceling" => Ok(RunRowStatus::Canceling),
            "canceled" => Ok(RunRowStatus::Canceled),
            other => Err(format!("unknown run status: {other}")),
        }
    }
}

/// Outcome of a recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickRowStatus {
    Started,
    Skipped,
    Success,
    Failure,
}

impl std::fmt::Display for TickRowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TickRowStatus::Started => "started",
            TickRowStatus::Skipped => "skipped",
            TickRowStatus::Success => "success",
            TickRowStatus::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TickRowStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "started" => Ok(TickRowStatus::Started),
            "skipped" => Ok(TickRowStatus::Skipped),
            "success" => Ok(TickRowStatus::Success),
            "failure" => Ok(TickRowStatus::Failure),
            other => Err(format!("unknown tick status: {other}")),
        }
    }
}

/// A schedule definition as supplied by config (id assigned by the store).
#[derive(Debug, Clone)]
pub struct ScheduleDef {
    pub repository_location_name: String,
    pub repository_name: String,
    pub name: String,
    pub cron_schedule: String,
    pub execution_timezone: Option<String>,
    pub pipeline_name: String,
    pub solid_selection: Option<Vec<String>>,
    pub mode: String,
    pub partition_set_name: Option<String>,
}

/// A persisted schedule definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    /// UUID v4 string — stable across upserts of the same origin triple.
    pub id: String,
    pub repository_location_name: String,
    pub repository_name: String,
    pub name: String,
    pub cron_schedule: String,
    pub execution_timezone: Option<String>,
    pub pipeline_name: String,
    pub solid_selection: Option<Vec<String>>,
    pub mode: String,
    pub partition_set_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data specific to the kind of job origin, JSON-encoded in its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobSpecificRowData {
    Schedule { cron_schedule: String },
    Sensor { last_run_key: Option<String> },
}

/// A persisted job state record. Shares its id with the owning schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStateRow {
    pub id: String,
    pub name: String,
    pub job_type: JobRowType,
    pub status: JobRowStatus,
    pub specific_data: Option<JobSpecificRowData>,
    pub created_at: String,
    pub updated_at: String,
}

/// Ordered key/value pair attached to runs and repository origins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

/// A recorded pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub id: String,
    pub run_id: String,
    pub schedule_id: String,
    pub pipeline_name: String,
    pub status: RunRowStatus,
    pub tags: Vec<TagPair>,
    pub created_at: String,
}

/// Failure data attached to a tick, JSON-encoded in its column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickError {
    pub message: String,
    pub stack: Vec<String>,
    pub cause: Option<TickErrorCause>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickErrorCause {
    pub message: String,
    pub stack: Vec<String>,
}

/// A recorded evaluation instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRow {
    pub id: String,
    pub schedule_id: String,
    pub status: TickRowStatus,
    /// Epoch seconds of the evaluation instant.
    pub timestamp: f64,
    /// Run ids launched by this tick, in launch order.
    pub run_ids: Vec<String>,
    pub error: Option<TickError>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn statuses_round_trip_through_text() {
        for status in [
            RunRowStatus::Queued,
            RunRowStatus::NotStarted,
            RunRowStatus::Started,
            RunRowStatus::Canceled,
        ] {
            assert_eq!(RunRowStatus::from_str(&status.to_string()), Ok(status));
        }
        assert_eq!(
            TickRowStatus::from_str(&TickRowStatus::Failure.to_string()),
            Ok(TickRowStatus::Failure)
        );
        assert!(RunRowStatus::from_str("exploded").is_err());
    }

    #[test]
    fn specific_data_json_column_is_tagged() {
        let data = JobSpecificRowData::Schedule {
            cron_schedule: "0 2 * * *".into(),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"kind\":\"schedule\""));
        let back: JobSpecificRowData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
