use chrono::{DateTime, Utc};
use tracing::debug;

use cronwatch_core::config::{
    CronwatchConfig, SchedulerConfig, DEFAULT_FUTURE_TICKS_LIMIT, DEFAULT_RUNS_LIMIT,
    DEFAULT_TICKS_LIMIT,
};
use cronwatch_schema::{
    JobState, JobTick, RepositoryMetadata, RepositoryOrigin, RepositorySelector, Schedule,
    ScheduleFutureTick, ScheduleFutureTicks, ScheduleNotFoundError, ScheduleOrError,
    ScheduleRootQuery, ScheduleSelector, Scheduler, SchedulerNotDefinedError, SchedulerOrError,
    Schedules, SchedulesOrError, PartitionSet,
};
use cronwatch_store::{JobStateRow, ScheduleRow, StoreHandle};

use crate::convert::{
    job_status_to_wire, job_type_to_wire, python_error_from, run_to_wire, specific_data_to_wire,
    tick_error_to_wire, tick_run_to_wire, tick_status_to_wire,
};
use crate::error::Result;
use crate::future_ticks::future_tick_timestamps;

/// Resolve the schedule-root operation: scheduler status and the
/// schedule-or-error result, independently.
pub fn resolve_schedule_root(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &ScheduleSelector,
    now: DateTime<Utc>,
) -> ScheduleRootQuery {
    ScheduleRootQuery {
        scheduler: resolve_scheduler(config.scheduler.as_ref()),
        schedule_or_error: resolve_schedule(store, config, selector, now),
    }
}

/// Configuration-level status: is a scheduling daemon set up at all?
pub fn resolve_scheduler(scheduler: Option<&SchedulerConfig>) -> SchedulerOrError {
    match scheduler {
        Some(cfg) => SchedulerOrError::Scheduler(Scheduler {
            scheduler_class: cfg.scheduler_class.clone(),
        }),
        None => SchedulerOrError::SchedulerNotDefinedError(SchedulerNotDefinedError {
            message: "No scheduler is configured for this instance. \
                      Add a [scheduler] section to cronwatch.toml."
                .to_string(),
        }),
    }
}

/// Look up one schedule. Misses become `ScheduleNotFoundError`; any store
/// or cron failure becomes `PythonError` data.
pub fn resolve_schedule(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &ScheduleSelector,
    now: DateTime<Utc>,
) -> ScheduleOrError {
    match build_schedule_for_selector(store, config, selector, now) {
        Ok(Some(schedule)) => ScheduleOrError::Schedule(Box::new(schedule)),
        Ok(None) => {
            debug!(schedule = %selector.schedule_name, "schedule lookup missed");
            ScheduleOrError::ScheduleNotFoundError(ScheduleNotFoundError {
                message: format!(
                    "Schedule {} is not present in repository {} at location {}.",
                    selector.schedule_name,
                    selector.repository_name,
                    selector.repository_location_name
                ),
            })
        }
        Err(e) => ScheduleOrError::PythonError(python_error_from(&e)),
    }
}

/// All schedules of one repository, each fully resolved.
pub fn resolve_schedules(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &RepositorySelector,
    now: DateTime<Utc>,
) -> SchedulesOrError {
    let build = || -> Result<Vec<Schedule>> {
        let rows = store.list_schedules(
            &selector.repository_location_name,
            &selector.repository_name,
        )?;
        rows.into_iter()
            .map(|row| build_schedule(store, config, row, now))
            .collect()
    };
    match build() {
        Ok(results) => SchedulesOrError::Schedules(Schedules { results }),
        Err(e) => SchedulesOrError::PythonError(python_error_from(&e)),
    }
}

fn build_schedule_for_selector(
    store: &StoreHandle,
    config: &CronwatchConfig,
    selector: &ScheduleSelector,
    now: DateTime<Utc>,
) -> Result<Option<Schedule>> {
    let Some(row) = store.get_schedule(
        &selector.repository_location_name,
        &selector.repository_name,
        &selector.schedule_name,
    )?
    else {
        return Ok(None);
    };
    build_schedule(store, config, row, now).map(Some)
}

/// Assemble the full wire snapshot for one stored schedule.
pub(crate) fn build_schedule(
    store: &StoreHandle,
    config: &CronwatchConfig,
    row: ScheduleRow,
    now: DateTime<Utc>,
) -> Result<Schedule> {
    let ticks = future_tick_timestamps(
        &row.cron_schedule,
        row.execution_timezone.as_deref(),
        now,
        DEFAULT_FUTURE_TICKS_LIMIT,
    )?;

    let schedule_state = match store.get_job_state(&row.id)? {
        Some(state) => Some(build_job_state(store, config, &row, state)?),
        None => None,
    };

    Ok(Schedule {
        id: row.id,
        name: row.name,
        cron_schedule: row.cron_schedule,
        execution_timezone: row.execution_timezone,
        pipeline_name: row.pipeline_name,
        solid_selection: row
            .solid_selection
            .map(|solids| solids.into_iter().map(Some).collect()),
        mode: row.mode,
        partition_set: row.partition_set_name.map(|name| PartitionSet { name }),
        schedule_state,
        future_ticks: ScheduleFutureTicks {
            results: ticks
                .into_iter()
                .map(|timestamp| ScheduleFutureTick { timestamp })
                .collect(),
        },
    })
}

fn build_job_state(
    store: &StoreHandle,
    config: &CronwatchConfig,
    schedule: &ScheduleRow,
    state: JobStateRow,
) -> Result<JobState> {
    let runs = store
        .runs_for(&schedule.id, DEFAULT_RUNS_LIMIT)?
        .into_iter()
        .map(run_to_wire)
        .collect();

    let mut ticks = Vec::new();
    for tick in store.ticks_for(&schedule.id, DEFAULT_TICKS_LIMIT)? {
        let tick_runs = store
            .runs_by_run_ids(&tick.run_ids)?
            .into_iter()
            .map(tick_run_to_wire)
            .collect();
        ticks.push(JobTick {
            id: tick.id,
            status: tick_status_to_wire(tick.status),
            timestamp: tick.timestamp,
            runs: tick_runs,
            error: tick.error.map(tick_error_to_wire),
        });
    }

    Ok(JobState {
        id: state.id,
        name: state.name,
        job_type: job_type_to_wire(state.job_type),
        status: job_status_to_wire(state.status),
        repository_origin: repository_origin(
            config,
            &schedule.repository_location_name,
            &schedule.repository_name,
        ),
        job_specific_data: state.specific_data.map(specific_data_to_wire),
        runs,
        runs_count: store.runs_count(&schedule.id)?,
        ticks,
        running_count: store.running_count(&schedule.id)?,
    })
}

/// Origin info for a repository, with metadata from config when the
/// repository is still declared there.
fn repository_origin(
    config: &CronwatchConfig,
    location_name: &str,
    repository_name: &str,
) -> RepositoryOrigin {
    let metadata = config
        .repositories
        .iter()
        .find(|repo| repo.location_name == location_name && repo.name == repository_name)
        .map(|repo| {
            repo.metadata
                .iter()
                .map(|entry| RepositoryMetadata {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    RepositoryOrigin {
        repository_location_name: location_name.to_string(),
        repository_name: repository_name.to_string(),
        repository_location_metadata: metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cronwatch_core::config::{MetadataEntry, RepositoryConfig};
    use cronwatch_schema::{JobSpecificData, JobStatus, JobTickStatus, PipelineRunStatus};
    use cronwatch_store::{RunRowStatus, ScheduleDef, TagPair, TickError, TickRowStatus};
    use rusqlite::Connection;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn test_store() -> StoreHandle {
        StoreHandle::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn test_config() -> CronwatchConfig {
        CronwatchConfig {
            repositories: vec![RepositoryConfig {
                location_name: "analytics.workspace".into(),
                name: "analytics".into(),
                metadata: vec![MetadataEntry {
                    key: "host".into(),
                    value: "worker-1".into(),
                }],
                schedules: vec![],
            }],
            ..CronwatchConfig::default()
        }
    }

    fn nightly_def() -> ScheduleDef {
        ScheduleDef {
            repository_location_name: "analytics.workspace".into(),
            repository_name: "analytics".into(),
            name: "nightly".into(),
            cron_schedule: "0 2 * * *".into(),
            execution_timezone: None,
            pipeline_name: "report_pipeline".into(),
            solid_selection: None,
            mode: "default".into(),
            partition_set_name: Some("nightly_partitions".into()),
        }
    }

    fn selector() -> ScheduleSelector {
        ScheduleSelector::new("analytics.workspace", "analytics", "nightly")
    }

    #[test]
    fn missing_scheduler_and_found_schedule_are_independent() {
        let store = test_store();
        let config = test_config();
        store.upsert_schedule(&nightly_def()).unwrap();

        let response = resolve_schedule_root(&store, &config, &selector(), fixed_now());

        assert!(matches!(
            response.scheduler,
            SchedulerOrError::SchedulerNotDefinedError(_)
        ));
        match response.schedule_or_error {
            ScheduleOrError::Schedule(schedule) => {
                assert_eq!(schedule.name, "nightly");
                assert_eq!(
                    schedule.partition_set.as_ref().unwrap().name,
                    "nightly_partitions"
                );
                // Never started: no state, but future ticks still project.
                assert!(schedule.schedule_state.is_none());
                assert_eq!(
                    schedule.future_ticks.results.len(),
                    DEFAULT_FUTURE_TICKS_LIMIT
                );
                // Next 02:00 UTC after the fixed instant.
                assert_eq!(schedule.future_ticks.results[0].timestamp, 1_700_013_600.0);
            }
            other => panic!("expected Schedule, got {other:?}"),
        }
    }

    #[test]
    fn configured_scheduler_reports_its_class() {
        let result = resolve_scheduler(Some(&SchedulerConfig {
            scheduler_class: Some("CronDaemon".into()),
        }));
        match result {
            SchedulerOrError::Scheduler(s) => {
                assert_eq!(s.scheduler_class.as_deref(), Some("CronDaemon"))
            }
            other => panic!("expected Scheduler, got {other:?}"),
        }
    }

    #[test]
    fn unknown_schedule_becomes_not_found_data() {
        let store = test_store();
        let config = test_config();

        let result = resolve_schedule(
            &store,
            &config,
            &ScheduleSelector::new("analytics.workspace", "analytics", "ghost"),
            fixed_now(),
        );
        match result {
            ScheduleOrError::ScheduleNotFoundError(e) => {
                assert!(e.message.contains("ghost"));
                assert!(e.message.contains("analytics"));
            }
            other => panic!("expected ScheduleNotFoundError, got {other:?}"),
        }
    }

    #[test]
    fn invalid_cron_expression_becomes_python_error_data() {
        let store = test_store();
        let config = test_config();
        let mut def = nightly_def();
        def.cron_schedule = "not a cron".into();
        store.upsert_schedule(&def).unwrap();

        let result = resolve_schedule(&store, &config, &selector(), fixed_now());
        match result {
            ScheduleOrError::PythonError(e) => {
                assert!(e.message.contains("not a cron"));
                assert!(!e.stack.is_empty());
            }
            other => panic!("expected PythonError, got {other:?}"),
        }
    }

    #[test]
    fn started_schedule_resolves_its_full_job_state() {
        let store = test_store();
        let config = test_config();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();
        store.start_schedule(&schedule).unwrap();

        let run = store
            .record_run(
                &schedule.id,
                "report_pipeline",
                RunRowStatus::Started,
                &[TagPair {
                    key: "trigger".into(),
                    value: "nightly".into(),
                }],
            )
            .unwrap();
        store
            .record_tick(
                &schedule.id,
                TickRowStatus::Success,
                1_699_999_000.0,
                &[run.run_id.clone()],
                None,
            )
            .unwrap();
        store
            .record_tick(
                &schedule.id,
                TickRowStatus::Failure,
                1_699_999_500.0,
                &[],
                Some(&TickError {
                    message: "evaluation failed".into(),
                    stack: vec!["frame".into()],
                    cause: None,
                }),
            )
            .unwrap();

        let result = resolve_schedule(&store, &config, &selector(), fixed_now());
        let resolved = match result {
            ScheduleOrError::Schedule(s) => *s,
            other => panic!("expected Schedule, got {other:?}"),
        };
        let schedule_id = resolved.id.clone();
        let state = resolved.schedule_state.expect("started schedule has state");

        assert_eq!(state.id, schedule_id);
        assert_eq!(state.status, JobStatus::Running);
        match state.job_specific_data {
            Some(JobSpecificData::ScheduleJobData(ref data)) => {
                assert_eq!(data.cron_schedule, "0 2 * * *")
            }
            ref other => panic!("expected ScheduleJobData, got {other:?}"),
        }

        assert_eq!(state.runs_count, 1);
        assert_eq!(state.running_count, 1);
        assert_eq!(state.runs[0].status, PipelineRunStatus::Started);
        assert_eq!(state.runs[0].tags[0].key, "trigger");

        // Ticks newest first; the failed one keeps its error, the successful
        // one resolves its run to the brief shape.
        assert_eq!(state.ticks.len(), 2);
        assert_eq!(state.ticks[0].status, JobTickStatus::Failure);
        assert!(!state.ticks[0].error.as_ref().unwrap().stack.is_empty());
        assert_eq!(state.ticks[1].runs[0].run_id, run.run_id);

        let origin = &state.repository_origin;
        assert_eq!(origin.repository_location_name, "analytics.workspace");
        assert_eq!(origin.repository_location_metadata[0].value, "worker-1");
    }

    #[test]
    fn listing_resolves_every_schedule_of_the_repository() {
        let store = test_store();
        let config = test_config();
        store.upsert_schedule(&nightly_def()).unwrap();
        let mut other = nightly_def();
        other.name = "weekly".into();
        store.upsert_schedule(&other).unwrap();

        let result = resolve_schedules(
            &store,
            &config,
            &RepositorySelector {
                repository_location_name: "analytics.workspace".into(),
                repository_name: "analytics".into(),
            },
            fixed_now(),
        );
        match result {
            SchedulesOrError::Schedules(listing) => {
                let names: Vec<_> = listing.results.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["nightly", "weekly"]);
            }
            other => panic!("expected Schedules, got {other:?}"),
        }
    }
}
