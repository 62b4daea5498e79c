//! `cronwatch-core` — shared configuration, constants, and the core error type.
//!
//! Every other crate in the workspace depends on this one. Configuration is
//! loaded from a TOML file merged with `CRONWATCH_*` environment overrides;
//! the config file is also where repositories and their schedule definitions
//! are declared.

pub mod config;
pub mod error;

pub use config::CronwatchConfig;
pub use error::{CronwatchError, Result};
