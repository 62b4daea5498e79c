//! Conversions from internal store rows to wire-contract types.
//!
//! The store keeps its own snake_case status enums (what SQLite holds);
//! the wire speaks SCREAMING_SNAKE_CASE. Both sides are closed sets, so
//! every mapping here is total.

use cronwatch_schema::{
    JobSpecificData, JobStatus, JobTickStatus, JobType, PipelineRun, PipelineRunStatus,
    PipelineTag, PythonError, PythonErrorCause, ScheduleJobData, SensorJobData, TickRun,
};
use cronwatch_store::{
    JobRowStatus, JobRowType, JobSpecificRowData, RunRow, RunRowStatus, TickError, TickRowStatus,
};

pub fn run_status_to_wire(status: RunRowStatus) -> PipelineRunStatus {
    match status {
        RunRowStatus::Queued => PipelineRunStatus::Queued,
        RunRowStatus::NotStarted => PipelineRunStatus::NotStarted,
        RunRowStatus::Managed => PipelineRunStatus::Managed,
        RunRowStatus::Started => PipelineRunStatus::Started,
        RunRowStatus::Success => PipelineRunStatus::Success,
        RunRowStatus::Failure => PipelineRunStatus::Failure,
        RunRowStatus::Canceling => PipelineRunStatus::Canceling,
        RunRowStatus::Canceled => PipelineRunStatus::Canceled,
    }
}

pub fn tick_status_to_wire(status: TickRowStatus) -> JobTickStatus {
    match status {
        TickRowStatus::Started => JobTickStatus::Started,
        TickRowStatus::Skipped => JobTickStatus::Skipped,
        TickRowStatus::Success => JobTickStatus::Success,
        TickRowStatus::Failure => JobTickStatus::Failure,
    }
}

pub fn job_type_to_wire(job_type: JobRowType) -> JobType {
    match job_type {
        JobRowType::Schedule => JobType::Schedule,
        JobRowType::Sensor => JobType::Sensor,
    }
}

pub fn job_status_to_wire(status: JobRowStatus) -> JobStatus {
    match status {
        JobRowStatus::Running => JobStatus::Running,
        JobRowStatus::Stopped => JobStatus::Stopped,
    }
}

pub fn specific_data_to_wire(data: JobSpecificRowData) -> JobSpecificData {
    match data {
        JobSpecificRowData::Schedule { cron_schedule } => {
            JobSpecificData::ScheduleJobData(ScheduleJobData { cron_schedule })
        }
        JobSpecificRowData::Sensor { last_run_key } => {
            JobSpecificData::SensorJobData(SensorJobData { last_run_key })
        }
    }
}

pub fn run_to_wire(run: RunRow) -> PipelineRun {
    PipelineRun {
        id: run.id,
        run_id: run.run_id,
        pipeline_name: run.pipeline_name,
        status: run_status_to_wire(run.status),
        tags: run
            .tags
            .into_iter()
            .map(|tag| PipelineTag {
                key: tag.key,
                value: tag.value,
            })
            .collect(),
    }
}

/// The brief run shape embedded in ticks.
pub fn tick_run_to_wire(run: RunRow) -> TickRun {
    TickRun {
        id: run.id,
        run_id: run.run_id,
        status: run_status_to_wire(run.status),
    }
}

pub fn tick_error_to_wire(error: TickError) -> PythonError {
    PythonError {
        message: error.message,
        stack: error.stack,
        cause: error.cause.map(|cause| PythonErrorCause {
            message: cause.message,
            stack: cause.stack,
        }),
    }
}

/// Build a `PythonError` from an error and its source chain.
///
/// The stack holds the full chain outermost-first (so it is never empty);
/// the first source becomes the cause, with the remaining sources as the
/// cause's stack.
pub fn python_error_from(err: &(dyn std::error::Error + 'static)) -> PythonError {
    let message = err.to_string();

    let mut sources = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        sources.push(source.to_string());
        current = source.source();
    }

    let mut stack = vec![message.clone()];
    stack.extend(sources.iter().cloned());

    let cause = sources.split_first().map(|(first, rest)| PythonErrorCause {
        message: first.clone(),
        stack: rest.to_vec(),
    });

    PythonError {
        message,
        stack,
        cause,
    }
}
