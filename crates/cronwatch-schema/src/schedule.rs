use serde::{Deserialize, Serialize};

use crate::job_state::JobState;

/// Full snapshot of one schedule: its definition, its current job state
/// (when started at least once), and the projected future ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub cron_schedule: String,
    /// IANA timezone the cron expression is evaluated in; UTC when absent.
    pub execution_timezone: Option<String>,
    pub pipeline_name: String,
    /// Optional subset of solids/steps the schedule executes.
    pub solid_selection: Option<Vec<Option<String>>>,
    pub mode: String,
    pub partition_set: Option<PartitionSet>,
    pub schedule_state: Option<JobState>,
    pub future_ticks: ScheduleFutureTicks,
}

/// Reference to the partition set a schedule is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSet {
    pub name: String,
}

/// Ordered projection of upcoming tick instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFutureTicks {
    pub results: Vec<ScheduleFutureTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFutureTick {
    /// Epoch seconds of the predicted fire instant.
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_schedule() -> Schedule {
        Schedule {
            id: "sched-1".into(),
            name: "nightly".into(),
            cron_schedule: "0 2 * * *".into(),
            execution_timezone: None,
            pipeline_name: "report_pipeline".into(),
            solid_selection: None,
            mode: "default".into(),
            partition_set: None,
            schedule_state: None,
            future_ticks: ScheduleFutureTicks {
                results: vec![ScheduleFutureTick {
                    timestamp: 1_700_000_000.0,
                }],
            },
        }
    }

    #[test]
    fn optional_fields_serialize_as_null_and_round_trip() {
        let schedule = bare_schedule();
        let v = serde_json::to_value(&schedule).unwrap();
        assert!(v["executionTimezone"].is_null());
        assert!(v["partitionSet"].is_null());
        assert!(v["scheduleState"].is_null());
        assert_eq!(v["cronSchedule"], "0 2 * * *");

        let back: Schedule = serde_json::from_str(&v.to_string()).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn absent_optionals_deserialize_without_failure() {
        let json = r#"{
            "id": "s",
            "name": "n",
            "cronSchedule": "* * * * *",
            "pipelineName": "p",
            "mode": "default",
            "futureTicks": {"results": []}
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert!(schedule.execution_timezone.is_none());
        assert!(schedule.solid_selection.is_none());
        assert!(schedule.partition_set.is_none());
        assert!(schedule.schedule_state.is_none());
    }

    #[test]
    fn solid_selection_allows_null_entries() {
        let json = r#"{
            "id": "s",
            "name": "n",
            "cronSchedule": "* * * * *",
            "pipelineName": "p",
            "solidSelection": ["ingest", null, "publish"],
            "mode": "default",
            "futureTicks": {"results": []}
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        let selection = schedule.solid_selection.unwrap();
        assert_eq!(selection.len(), 3);
        assert!(selection[1].is_none());
    }
}
