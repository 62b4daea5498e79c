use rusqlite::Connection;

use crate::error::Result;

/// Initialise the cronwatch schema in `conn`.
///
/// Creates all four tables (idempotent) plus the indexes the per-schedule
/// listing queries need. Definitions are unique per origin triple so config
/// re-registration on startup upserts instead of duplicating.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schedules (
            id                        TEXT NOT NULL PRIMARY KEY,
            repository_location_name  TEXT NOT NULL,
            repository_name           TEXT NOT NULL,
            name                      TEXT NOT NULL,
            cron_schedule             TEXT NOT NULL,
            execution_timezone        TEXT,
            pipeline_name             TEXT NOT NULL,
            solid_selection           TEXT,               -- JSON array or NULL
            mode                      TEXT NOT NULL DEFAULT 'default',
            partition_set_name        TEXT,
            created_at                TEXT NOT NULL,
            updated_at                TEXT NOT NULL,
            UNIQUE (repository_location_name, repository_name, name)
        ) STRICT;

        CREATE TABLE IF NOT EXISTS job_states (
            id             TEXT NOT NULL PRIMARY KEY,      -- == schedules.id
            name           TEXT NOT NULL,
            job_type       TEXT NOT NULL DEFAULT 'schedule',
            status         TEXT NOT NULL DEFAULT 'stopped',
            specific_data  TEXT,                           -- JSON-encoded enum
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS runs (
            id             TEXT NOT NULL PRIMARY KEY,
            run_id         TEXT NOT NULL UNIQUE,
            schedule_id    TEXT NOT NULL,
            pipeline_name  TEXT NOT NULL,
            status         TEXT NOT NULL,
            tags           TEXT NOT NULL DEFAULT '[]',     -- ordered JSON pairs
            created_at     TEXT NOT NULL
        ) STRICT;

        -- Newest-first listing per schedule: WHERE schedule_id = ? ORDER BY created_at DESC
        CREATE INDEX IF NOT EXISTS idx_runs_schedule ON runs (schedule_id, created_at);

        CREATE TABLE IF NOT EXISTS ticks (
            id           TEXT NOT NULL PRIMARY KEY,
            schedule_id  TEXT NOT NULL,
            status       TEXT NOT NULL,
            timestamp    REAL NOT NULL,                    -- epoch seconds
            run_ids      TEXT NOT NULL DEFAULT '[]',       -- JSON array of runs.run_id
            error        TEXT,                             -- JSON message/stack/cause
            created_at   TEXT NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_ticks_schedule ON ticks (schedule_id, timestamp);
        ",
    )?;
    Ok(())
}
