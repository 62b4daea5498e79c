use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::{
    db::init_db,
    error::{Result, StoreError},
    types::{
        JobSpecificRowData, JobStateRow, RunRow, RunRowStatus, ScheduleDef, ScheduleRow, TagPair,
        TickError, TickRow, TickRowStatus,
    },
};

/// Shared handle to the cronwatch database.
///
/// Wraps its own `Connection` behind a mutex so HTTP handlers and the
/// startup registration pass can use one store without conflicting.
#[derive(Clone)]
pub struct StoreHandle {
    conn: Arc<Mutex<Connection>>,
}

impl StoreHandle {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // --- schedule definitions ----------------------------------------------

    /// Insert or update a schedule definition.
    ///
    /// The origin triple (location, repository, name) is the conflict key;
    /// an existing schedule keeps its id so job state, runs, and ticks stay
    /// attached across config re-registration.
    pub fn upsert_schedule(&self, def: &ScheduleDef) -> Result<ScheduleRow> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let solid_selection = def
            .solid_selection
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO schedules
             (id, repository_location_name, repository_name, name, cron_schedule,
              execution_timezone, pipeline_name, solid_selection, mode,
              partition_set_name, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?11)
             ON CONFLICT (repository_location_name, repository_name, name) DO UPDATE SET
               cron_schedule = excluded.cron_schedule,
               execution_timezone = excluded.execution_timezone,
               pipeline_name = excluded.pipeline_name,
               solid_selection = excluded.solid_selection,
               mode = excluded.mode,
               partition_set_name = excluded.partition_set_name,
               updated_at = excluded.updated_at",
            rusqlite::params![
                id,
                def.repository_location_name,
                def.repository_name,
                def.name,
                def.cron_schedule,
                def.execution_timezone,
                def.pipeline_name,
                solid_selection,
                def.mode,
                def.partition_set_name,
                now,
            ],
        )?;
        info!(schedule = %def.name, repository = %def.repository_name, "schedule registered");

        fetch_schedule(
            &conn,
            &def.repository_location_name,
            &def.repository_name,
            &def.name,
        )?
        .ok_or(StoreError::Database(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_schedule(
        &self,
        repository_location_name: &str,
        repository_name: &str,
        name: &str,
    ) -> Result<Option<ScheduleRow>> {
        fetch_schedule(&self.conn(), repository_location_name, repository_name, name)
    }

    /// All schedules of one repository, ordered by name.
    pub fn list_schedules(
        &self,
        repository_location_name: &str,
        repository_name: &str,
    ) -> Result<Vec<ScheduleRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, repository_location_name, repository_name, name, cron_schedule,
                    execution_timezone, pipeline_name, solid_selection, mode,
                    partition_set_name, created_at, updated_at
             FROM schedules
             WHERE repository_location_name = ?1 AND repository_name = ?2
             ORDER BY name",
        )?;
        let rows = stmt
            .query_map(
                rusqlite::params![repository_location_name, repository_name],
                schedule_tuple,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_schedule).collect()
    }

    pub fn schedule_count(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM schedules", [], |row| row.get(0))?;
        Ok(count)
    }

    // --- job state ---------------------------------------------------------

    /// Mark a schedule's job origin as picked up by the daemon, creating the
    /// state record on first start.
    pub fn start_schedule(&self, schedule: &ScheduleRow) -> Result<JobStateRow> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let specific = serde_json::to_string(&JobSpecificRowData::Schedule {
            cron_schedule: schedule.cron_schedule.clone(),
        })?;

        conn.execute(
            "INSERT INTO job_states (id, name, job_type, status, specific_data, created_at, updated_at)
             VALUES (?1,?2,'schedule','running',?3,?4,?4)
             ON CONFLICT (id) DO UPDATE SET
               status = 'running',
               specific_data = excluded.specific_data,
               updated_at = excluded.updated_at",
            rusqlite::params![schedule.id, schedule.name, specific, now],
        )?;
        info!(schedule_id = %schedule.id, name = %schedule.name, "schedule started");

        fetch_job_state(&conn, &schedule.id)?.ok_or_else(|| StoreError::JobStateNotFound {
            id: schedule.id.clone(),
        })
    }

    /// Mark a schedule's job origin as stopped. Errors if it was never started.
    pub fn stop_schedule(&self, schedule_id: &str) -> Result<JobStateRow> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE job_states SET status = 'stopped', updated_at = ?2 WHERE id = ?1",
            rusqlite::params![schedule_id, now],
        )?;
        if n == 0 {
            return Err(StoreError::JobStateNotFound {
                id: schedule_id.to_string(),
            });
        }
        info!(schedule_id = %schedule_id, "schedule stopped");

        fetch_job_state(&conn, schedule_id)?.ok_or_else(|| StoreError::JobStateNotFound {
            id: schedule_id.to_string(),
        })
    }

    pub fn get_job_state(&self, schedule_id: &str) -> Result<Option<JobStateRow>> {
        fetch_job_state(&self.conn(), schedule_id)
    }

    // --- runs and ticks ----------------------------------------------------

    /// Record a run launched for `schedule_id`. Ingestion surface for the
    /// external daemon; ids are assigned here.
    pub fn record_run(
        &self,
        schedule_id: &str,
        pipeline_name: &str,
        status: RunRowStatus,
        tags: &[TagPair],
    ) -> Result<RunRow> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let run_id = Uuid::new_v4().to_string();
        let tags_json = serde_json::to_string(tags)?;

        conn.execute(
            "INSERT INTO runs (id, run_id, schedule_id, pipeline_name, status, tags, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            rusqlite::params![
                id,
                run_id,
                schedule_id,
                pipeline_name,
                status.to_string(),
                tags_json,
                now
            ],
        )?;
        info!(run_id = %run_id, schedule_id = %schedule_id, status = %status, "run recorded");

        Ok(RunRow {
            id,
            run_id,
            schedule_id: schedule_id.to_string(),
            pipeline_name: pipeline_name.to_string(),
            status,
            tags: tags.to_vec(),
            created_at: now,
        })
    }

    /// Update the status of a previously recorded run.
    pub fn update_run_status(&self, run_id: &str, status: RunRowStatus) -> Result<()> {
        let conn = self.conn();
        let n = conn.execute(
            "UPDATE runs SET status = ?2 WHERE run_id = ?1",
            rusqlite::params![run_id, status.to_string()],
        )?;
        if n == 0 {
            return Err(StoreError::CorruptStatus(format!(
                "no run with run_id: {run_id}"
            )));
        }
        Ok(())
    }

    /// Record one evaluation instant for `schedule_id`.
    pub fn record_tick(
        &self,
        schedule_id: &str,
        status: TickRowStatus,
        timestamp: f64,
        run_ids: &[String],
        error: Option<&TickError>,
    ) -> Result<TickRow> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let run_ids_json = serde_json::to_string(run_ids)?;
        let error_json = error.map(serde_json::to_string).transpose()?;

        conn.execute(
            "INSERT INTO ticks (id, schedule_id, status, timestamp, run_ids, error, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            rusqlite::params![
                id,
                schedule_id,
                status.to_string(),
                timestamp,
                run_ids_json,
                error_json,
                now
            ],
        )?;
        info!(tick_id = %id, schedule_id = %schedule_id, status = %status, "tick recorded");

        Ok(TickRow {
            id,
            schedule_id: schedule_id.to_string(),
            status,
            timestamp,
            run_ids: run_ids.to_vec(),
            error: error.cloned(),
            created_at: now,
        })
    }

    /// Recent runs for a schedule, newest first.
    pub fn runs_for(&self, schedule_id: &str, limit: usize) -> Result<Vec<RunRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, run_id, schedule_id, pipeline_name, status, tags, created_at
             FROM runs WHERE schedule_id = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![schedule_id, limit as i64], run_tuple)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_run).collect()
    }

    /// Resolve run ids to rows, preserving the requested order. Ids with no
    /// matching row are skipped.
    pub fn runs_by_run_ids(&self, run_ids: &[String]) -> Result<Vec<RunRow>> {
        let conn = self.conn();
        let mut out = Vec::with_capacity(run_ids.len());
        for run_id in run_ids {
            let row = conn
                .query_row(
                    "SELECT id, run_id, schedule_id, pipeline_name, status, tags, created_at
                     FROM runs WHERE run_id = ?1",
                    [run_id],
                    run_tuple,
                )
                .optional()?;
            if let Some(tuple) = row {
                out.push(decode_run(tuple)?);
            }
        }
        Ok(out)
    }

    /// Recent ticks for a schedule, newest first.
    pub fn ticks_for(&self, schedule_id: &str, limit: usize) -> Result<Vec<TickRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, schedule_id, status, timestamp, run_ids, error, created_at
             FROM ticks WHERE schedule_id = ?1
             ORDER BY timestamp DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![schedule_id, limit as i64], tick_tuple)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode_tick).collect()
    }

    /// Total number of runs ever recorded for a schedule.
    pub fn runs_count(&self, schedule_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM runs WHERE schedule_id = ?1",
            [schedule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of runs currently in progress for a schedule.
    pub fn running_count(&self, schedule_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM runs WHERE schedule_id = ?1 AND status = 'started'",
            [schedule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// --- row mapping -----------------------------------------------------------

type ScheduleTuple = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    String,
    Option<String>,
    String,
    String,
);

fn schedule_tuple(row: &rusqlite::Row) -> rusqlite::Result<ScheduleTuple> {
    Ok((
        row.get(0)?,  // id
        row.get(1)?,  // repository_location_name
        row.get(2)?,  // repository_name
        row.get(3)?,  // name
        row.get(4)?,  // cron_schedule
        row.get(5)?,  // execution_timezone
        row.get(6)?,  // pipeline_name
        row.get(7)?,  // solid_selection JSON
        row.get(8)?,  // mode
        row.get(9)?,  // partition_set_name
        row.get(10)?, // created_at
        row.get(11)?, // updated_at
    ))
}

fn decode_schedule(t: ScheduleTuple) -> Result<ScheduleRow> {
    let (
        id,
        repository_location_name,
        repository_name,
        name,
        cron_schedule,
        execution_timezone,
        pipeline_name,
        solid_selection_json,
        mode,
        partition_set_name,
        created_at,
        updated_at,
    ) = t;
    let solid_selection = solid_selection_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    Ok(ScheduleRow {
        id,
        repository_location_name,
        repository_name,
        name,
        cron_schedule,
        execution_timezone,
        pipeline_name,
        solid_selection,
        mode,
        partition_set_name,
        created_at,
        updated_at,
    })
}

fn fetch_schedule(
    conn: &Connection,
    repository_location_name: &str,
    repository_name: &str,
    name: &str,
) -> Result<Option<ScheduleRow>> {
    let tuple = conn
        .query_row(
            "SELECT id, repository_location_name, repository_name, name, cron_schedule,
                    execution_timezone, pipeline_name, solid_selection, mode,
                    partition_set_name, created_at, updated_at
             FROM schedules
             WHERE repository_location_name = ?1 AND repository_name = ?2 AND name = ?3",
            rusqlite::params![repository_location_name, repository_name, name],
            schedule_tuple,
        )
        .optional()?;
    tuple.map(decode_schedule).transpose()
}

fn fetch_job_state(conn: &Connection, schedule_id: &str) -> Result<Option<JobStateRow>> {
    let tuple: Option<(String, String, String, String, Option<String>, String, String)> = conn
        .query_row(
            "SELECT id, name, job_type, status, specific_data, created_at, updated_at
             FROM job_states WHERE id = ?1",
            [schedule_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, job_type, status, specific_json, created_at, updated_at)) = tuple else {
        return Ok(None);
    };
    let specific_data = specific_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    Ok(Some(JobStateRow {
        id,
        name,
        job_type: job_type.parse().map_err(StoreError::CorruptStatus)?,
        status: status.parse().map_err(StoreError::CorruptStatus)?,
        specific_data,
        created_at,
        updated_at,
    }))
}

type RunTuple = (String, String, String, String, String, String, String);

fn run_tuple(row: &rusqlite::Row) -> rusqlite::Result<RunTuple> {
    Ok((
        row.get(0)?, // id
        row.get(1)?, // run_id
        row.get(2)?, // schedule_id
        row.get(3)?, // pipeline_name
        row.get(4)?, // status
        row.get(5)?, // tags JSON
        row.get(6)?, // created_at
    ))
}

fn decode_run(t: RunTuple) -> Result<RunRow> {
    let (id, run_id, schedule_id, pipeline_name, status, tags_json, created_at) = t;
    Ok(RunRow {
        id,
        run_id,
        schedule_id,
        pipeline_name,
        status: status.parse().map_err(StoreError::CorruptStatus)?,
        tags: serde_json::from_str(&tags_json)?,
        created_at,
    })
}

type TickTuple = (String, String, String, f64, String, Option<String>, String);

fn tick_tuple(row: &rusqlite::Row) -> rusqlite::Result<TickTuple> {
    Ok((
        row.get(0)?, // id
        row.get(1)?, // schedule_id
        row.get(2)?, // status
        row.get(3)?, // timestamp
        row.get(4)?, // run_ids JSON
        row.get(5)?, // error JSON
        row.get(6)?, // created_at
    ))
}

fn decode_tick(t: TickTuple) -> Result<TickRow> {
    let (id, schedule_id, status, timestamp, run_ids_json, error_json, created_at) = t;
    Ok(TickRow {
        id,
        schedule_id,
        status: status.parse().map_err(StoreError::CorruptStatus)?,
        timestamp,
        run_ids: serde_json::from_str(&run_ids_json)?,
        error: error_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobRowStatus, TickErrorCause};

    fn test_store() -> StoreHandle {
        StoreHandle::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn nightly_def() -> ScheduleDef {
        ScheduleDef {
            repository_location_name: "analytics.workspace".into(),
            repository_name: "analytics".into(),
            name: "nightly".into(),
            cron_schedule: "0 2 * * *".into(),
            execution_timezone: Some("US/Central".into()),
            pipeline_name: "report_pipeline".into(),
            solid_selection: Some(vec!["ingest".into(), "publish".into()]),
            mode: "default".into(),
            partition_set_name: None,
        }
    }

    #[test]
    fn upsert_preserves_id_and_updates_fields() {
        let store = test_store();
        let first = store.upsert_schedule(&nightly_def()).unwrap();

        let mut changed = nightly_def();
        changed.cron_schedule = "30 3 * * *".into();
        let second = store.upsert_schedule(&changed).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.cron_schedule, "30 3 * * *");
        assert_eq!(store.schedule_count().unwrap(), 1);
    }

    #[test]
    fn get_schedule_misses_cleanly() {
        let store = test_store();
        let found = store
            .get_schedule("nowhere", "nothing", "missing")
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn list_schedules_orders_by_name() {
        let store = test_store();
        let mut def = nightly_def();
        def.name = "weekly".into();
        store.upsert_schedule(&def).unwrap();
        store.upsert_schedule(&nightly_def()).unwrap();

        let schedules = store
            .list_schedules("analytics.workspace", "analytics")
            .unwrap();
        let names: Vec<_> = schedules.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["nightly", "weekly"]);
    }

    #[test]
    fn start_then_stop_flips_status() {
        let store = test_store();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();

        assert!(store.get_job_state(&schedule.id).unwrap().is_none());

        let started = store.start_schedule(&schedule).unwrap();
        assert_eq!(started.id, schedule.id);
        assert_eq!(started.status, JobRowStatus::Running);
        match started.specific_data {
            Some(JobSpecificRowData::Schedule { ref cron_schedule }) => {
                assert_eq!(cron_schedule, "0 2 * * *")
            }
            ref other => panic!("expected schedule data, got {other:?}"),
        }

        let stopped = store.stop_schedule(&schedule.id).unwrap();
        assert_eq!(stopped.status, JobRowStatus::Stopped);
    }

    #[test]
    fn stop_without_start_errors() {
        let store = test_store();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();
        assert!(matches!(
            store.stop_schedule(&schedule.id),
            Err(StoreError::JobStateNotFound { .. })
        ));
    }

    #[test]
    fn runs_are_listed_newest_first_with_counts() {
        let store = test_store();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();

        let first = store
            .record_run(&schedule.id, "report_pipeline", RunRowStatus::Success, &[])
            .unwrap();
        let second = store
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

        let runs = store.runs_for(&schedule.id, 10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, second.run_id);
        assert_eq!(runs[1].run_id, first.run_id);
        assert_eq!(runs[0].tags[0].key, "trigger");

        assert_eq!(store.runs_count(&schedule.id).unwrap(), 2);
        assert_eq!(store.running_count(&schedule.id).unwrap(), 1);

        store
            .update_run_status(&second.run_id, RunRowStatus::Success)
            .unwrap();
        assert_eq!(store.running_count(&schedule.id).unwrap(), 0);
    }

    #[test]
    fn ticks_round_trip_with_error_and_run_ids() {
        let store = test_store();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();
        let run = store
            .record_run(&schedule.id, "report_pipeline", RunRowStatus::Success, &[])
            .unwrap();

        store
            .record_tick(
                &schedule.id,
                TickRowStatus::Success,
                1_700_000_000.0,
                &[run.run_id.clone()],
                None,
            )
            .unwrap();
        store
            .record_tick(
                &schedule.id,
                TickRowStatus::Failure,
                1_700_086_400.0,
                &[],
                Some(&TickError {
                    message: "cron evaluation failed".into(),
                    stack: vec!["frame".into()],
                    cause: Some(TickErrorCause {
                        message: "bad expression".into(),
                        stack: vec![],
                    }),
                }),
            )
            .unwrap();

        let ticks = store.ticks_for(&schedule.id, 10).unwrap();
        assert_eq!(ticks.len(), 2);
        // Newest first.
        assert_eq!(ticks[0].status, TickRowStatus::Failure);
        let error = ticks[0].error.as_ref().expect("failed tick keeps error");
        assert!(!error.stack.is_empty());
        assert_eq!(error.cause.as_ref().unwrap().message, "bad expression");

        assert_eq!(ticks[1].run_ids, vec![run.run_id.clone()]);
        let resolved = store.runs_by_run_ids(&ticks[1].run_ids).unwrap();
        assert_eq!(resolved[0].run_id, run.run_id);
    }

    #[test]
    fn runs_by_run_ids_skips_unknown_ids() {
        let store = test_store();
        let schedule = store.upsert_schedule(&nightly_def()).unwrap();
        let run = store
            .record_run(&schedule.id, "report_pipeline", RunRowStatus::Queued, &[])
            .unwrap();

        let resolved = store
            .runs_by_run_ids(&["ghost".into(), run.run_id.clone()])
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].run_id, run.run_id);
    }
}
