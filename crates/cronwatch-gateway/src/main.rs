use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use cronwatch_core::config::{CronwatchConfig, RepositoryConfig};
use cronwatch_store::{ScheduleDef, StoreHandle};

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cronwatch_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit CRONWATCH_CONFIG path > ~/.cronwatch/cronwatch.toml
    let config_path = std::env::var("CRONWATCH_CONFIG").ok();
    let config = CronwatchConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        CronwatchConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let store = StoreHandle::new(db)?;

    // register config-declared schedules (idempotent; ids survive restarts)
    let mut registered = 0usize;
    for repo in &config.repositories {
        for def in schedule_defs(repo) {
            store.upsert_schedule(&def)?;
            registered += 1;
        }
    }
    info!(count = registered, "schedules registered from config");

    let state = Arc::new(app::AppState::new(config, store));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("cronwatch gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Definitions a repository contributes to the store.
fn schedule_defs(repo: &RepositoryConfig) -> Vec<ScheduleDef> {
    repo.schedules
        .iter()
        .map(|schedule| ScheduleDef {
            repository_location_name: repo.location_name.clone(),
            repository_name: repo.name.clone(),
            name: schedule.name.clone(),
            cron_schedule: schedule.cron_schedule.clone(),
            execution_timezone: schedule.execution_timezone.clone(),
            pipeline_name: schedule.pipeline_name.clone(),
            solid_selection: schedule.solid_selection.clone(),
            mode: schedule.mode.clone(),
            partition_set_name: schedule.partition_set.clone(),
        })
        .collect()
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
