use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 7575;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// How many predicted future ticks a schedule query returns.
pub const DEFAULT_FUTURE_TICKS_LIMIT: usize = 5;
/// How many recent runs are embedded in a job state snapshot.
pub const DEFAULT_RUNS_LIMIT: usize = 10;
/// How many recent ticks are embedded in a job state snapshot.
pub const DEFAULT_TICKS_LIMIT: usize = 10;

/// Top-level config (cronwatch.toml + CRONWATCH_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronwatchConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Present when a scheduling daemon is configured for this instance.
    /// When the whole section is absent, schedule queries report the
    /// scheduler as not defined.
    pub scheduler: Option<SchedulerConfig>,
    /// Declared code locations and the schedules they contain.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for CronwatchConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            scheduler: None,
            repositories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// The scheduling daemon attached to this instance.
///
/// cronwatch only reports on the daemon; it never drives it. The optional
/// class name is surfaced verbatim in query responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub scheduler_class: Option<String>,
}

/// A declared code location holding schedule definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Name of the location the repository is loaded from.
    pub location_name: String,
    /// Repository name within the location.
    pub name: String,
    /// Ordered key/value metadata about the location.
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// One schedule definition inside a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub name: String,
    /// Standard 5-field Unix cron expression (6-field with seconds accepted).
    pub cron_schedule: String,
    /// The pipeline this schedule targets.
    pub pipeline_name: String,
    /// Execution mode of the target pipeline.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// IANA timezone the cron expression is evaluated in (UTC when unset).
    pub execution_timezone: Option<String>,
    /// Optional subset of solids/steps to execute.
    pub solid_selection: Option<Vec<String>>,
    /// Optional partition set this schedule is derived from.
    pub partition_set: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_mode() -> String {
    "default".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronwatch/cronwatch.db", home)
}

impl CronwatchConfig {
    /// Load config from a TOML file with CRONWATCH_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.cronwatch/cronwatch.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CronwatchConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CRONWATCH_").split("__"))
            .extract()
            .map_err(|e| crate::error::CronwatchError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronwatch/cronwatch.toml", home)
}
