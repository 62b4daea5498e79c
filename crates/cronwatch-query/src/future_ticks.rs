use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;

use crate::error::{QueryError, Result};

/// Convert a 5-field Unix cron expression to the 6-field form the `cron`
/// crate expects (leading seconds field). 6-field expressions pass through.
fn normalize_cron_expr(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    }
}

/// Predicted fire instants for `cron_schedule`, strictly after `from`.
///
/// Evaluation happens in `execution_timezone` (UTC when unset) so a
/// "02:00 daily" schedule fires at 02:00 wall-clock in its own zone.
/// Returns at most `limit` epoch-second timestamps in ascending order.
pub fn future_tick_timestamps(
    cron_schedule: &str,
    execution_timezone: Option<&str>,
    from: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<f64>> {
    let tz: Tz = match execution_timezone {
        Some(name) => name
            .parse()
            .map_err(|_| QueryError::InvalidTimezone(name.to_string()))?,
        None => chrono_tz::UTC,
    };

    let schedule = CronSchedule::from_str(&normalize_cron_expr(cron_schedule)).map_err(|e| {
        QueryError::InvalidCron {
            expression: cron_schedule.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(schedule
        .after(&from.with_timezone(&tz))
        .take(limit)
        .map(|instant| instant.timestamp() as f64)
        .collect())
}
