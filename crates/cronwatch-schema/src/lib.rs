//! `cronwatch-schema` — the wire contract for schedule queries.
//!
//! # Overview
//!
//! Every type here mirrors one object of the schedule-root response graph.
//! Field names serialize in camelCase; polymorphic results are tagged
//! unions whose discriminant field is `__typename`, with tag strings kept
//! exactly as consumers of the original contract expect (`"Schedule"`,
//! `"PythonError"`, `"SchedulerNotDefinedError"`, ...).
//!
//! Failure is data: error outcomes are ordinary variants of the result
//! unions, never a transport-level failure. Exactly one variant of each
//! union is populated per instance, and consumers must discriminate on the
//! tag before reading variant fields.
//!
//! Unknown input fields — including a `__typename` on concrete objects,
//! which the originating servers emit at every nesting level — are
//! tolerated and ignored on deserialization.

pub mod enums;
pub mod error;
pub mod job_state;
pub mod response;
pub mod schedule;
pub mod selector;

pub use enums::{JobStatus, JobTickStatus, JobType, PipelineRunStatus};
pub use error::{PythonError, PythonErrorCause, ScheduleNotFoundError, SchedulerNotDefinedError};
pub use job_state::{
    JobSpecificData, JobState, JobTick, PipelineRun, PipelineTag, RepositoryMetadata,
    RepositoryOrigin, ScheduleJobData, SensorJobData, TickRun,
};
pub use response::{
    ScheduleOrError, ScheduleRootQuery, Scheduler, SchedulerOrError, Schedules, SchedulesOrError,
};
pub use schedule::{PartitionSet, Schedule, ScheduleFutureTick, ScheduleFutureTicks};
pub use selector::{RepositorySelector, ScheduleRootQueryVariables, ScheduleSelector};
