//! `cronwatch-query` — turns a selector into a schedule-root response.
//!
//! # Overview
//!
//! The resolver reads the store and the loaded config and assembles the
//! wire envelope: scheduler status (configuration-level) alongside the
//! schedule-or-error result (instance-level). The two are independent.
//!
//! Nothing on the query path throws: store failures and bad cron
//! expressions become `PythonError` variants, a missing schedule becomes
//! `ScheduleNotFoundError`, and a missing `[scheduler]` config section
//! becomes `SchedulerNotDefinedError`.

pub mod convert;
pub mod error;
pub mod future_ticks;
pub mod mutation;
pub mod resolver;

pub use error::{QueryError, Result};
pub use future_ticks::future_tick_timestamps;
pub use mutation::{start_schedule, stop_schedule};
pub use resolver::{resolve_schedule, resolve_schedule_root, resolve_schedules, resolve_scheduler};
