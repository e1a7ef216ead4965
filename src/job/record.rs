// src/job/record.rs

//! The shared job record: the single mutable resource the supervisor, the
//! background worker and status pollers agree on.

use std::collections::VecDeque;

use serde::Serialize;

use crate::types::{Dataset, JobStatus};

/// Bounded FIFO of log lines. Once full, appending evicts the oldest line
/// first, so pollers always see the most recent window of runner output.
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// The one live execution job. Replaced (reset) at each accepted run
/// request; unchanged once terminal until the next accepted run.
#[derive(Debug)]
pub struct ExecutionJob {
    pub status: JobStatus,
    pub logs: LogBuffer,
    pub pass_count: u32,
    pub fail_count: u32,
    pub report_file: Option<String>,
    pub log_file: Option<String>,
    pub video_file: Option<String>,
    pub return_code: Option<i32>,
    /// Priority-sorted dataset of the current data-driven run, if any.
    pub dataset: Option<Dataset>,
    /// Process group of the active runner; `None` when no process is alive.
    /// Owned by the worker for the lifetime of one run.
    pub pgid: Option<i32>,
}

impl ExecutionJob {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            status: JobStatus::Idle,
            logs: LogBuffer::new(log_capacity),
            pass_count: 0,
            fail_count: 0,
            report_file: None,
            log_file: None,
            video_file: None,
            return_code: None,
            dataset: None,
            pgid: None,
        }
    }

    /// Reset all fields for a newly accepted run and move straight to
    /// `Running`. Log capacity is preserved.
    pub fn reset_for_run(&mut self) {
        self.status = JobStatus::Running;
        self.logs.clear();
        self.pass_count = 0;
        self.fail_count = 0;
        self.report_file = None;
        self.log_file = None;
        self.video_file = None;
        self.return_code = None;
        self.dataset = None;
        self.pgid = None;
    }

    /// Immutable snapshot for status polling.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            status: self.status,
            log_lines: self.logs.to_vec(),
            pass_count: self.pass_count,
            fail_count: self.fail_count,
            report_file: self.report_file.clone(),
            log_file: self.log_file.clone(),
            video_file: self.video_file.clone(),
            return_code: self.return_code,
            dataset: self.dataset.clone(),
        }
    }
}

/// Point-in-time view of the job record, safe to hand to concurrent
/// callers. Serializable so an HTTP layer can return it directly.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub log_lines: Vec<String>,
    pub pass_count: u32,
    pub fail_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Dataset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_buffer_evicts_oldest_first() {
        let mut buf = LogBuffer::new(3);
        for i in 0..5 {
            buf.push(format!("line {i}"));
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.to_vec(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn reset_clears_everything_and_moves_to_running() {
        let mut job = ExecutionJob::new(10);
        job.status = JobStatus::Failed;
        job.logs.push("old line");
        job.pass_count = 7;
        job.return_code = Some(3);
        job.report_file = Some("report-x.html".to_string());

        job.reset_for_run();

        assert_eq!(job.status, JobStatus::Running);
        assert!(job.logs.is_empty());
        assert_eq!(job.pass_count, 0);
        assert_eq!(job.return_code, None);
        assert_eq!(job.report_file, None);
        assert_eq!(job.logs.capacity(), 10);
    }
}
