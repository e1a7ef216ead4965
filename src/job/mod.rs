// src/job/mod.rs

//! The single-job state machine: shared record, supervisor, and the
//! background worker that owns one run end to end.

pub mod record;
pub mod supervisor;
mod worker;

pub use record::{ExecutionJob, JobSnapshot, LogBuffer};
pub use supervisor::{StopOutcome, Supervisor};
