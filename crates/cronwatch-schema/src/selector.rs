use serde::{Deserialize, Serialize};

/// Identifies one schedule: which location, which repository, which name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSelector {
    pub repository_location_name: String,
    pub repository_name: String,
    pub schedule_name: String,
}

impl ScheduleSelector {
    pub fn new(
        repository_location_name: impl Into<String>,
        repository_name: impl Into<String>,
        schedule_name: impl Into<String>,
    ) -> Self {
        Self {
            repository_location_name: repository_location_name.into(),
            repository_name: repository_name.into(),
            schedule_name: schedule_name.into(),
        }
    }
}

/// Identifies a repository, for operations that span all of its schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySelector {
    pub repository_location_name: String,
    pub repository_name: String,
}

/// Request body of the schedule-root query operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRootQueryVariables {
    pub schedule_selector: ScheduleSelector,
}
