// src/job/supervisor.rs

//! The top-level job supervisor.
//!
//! Owns the single shared [`ExecutionJob`] record and exposes the three
//! control operations: `start` (single-flight, rejects while a run is
//! active), `stop` (optimistic `Stopped` mark plus group termination with a
//! SIGKILL escalation after the grace period), and `status` (lock, clone,
//! release — never blocks on the worker).

use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::dataset;
use crate::errors::{Result, RoborunError};
use crate::exec;
use crate::job::record::{ExecutionJob, JobSnapshot};
use crate::job::worker;
use crate::types::{JobStatus, RunSpec};

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A run was active; its process group has been signalled.
    Signalled,
    /// Nothing was running. Informational, not an error.
    NotRunning,
}

/// Shared state between the supervisor handle, the worker and the
/// escalation task.
pub(crate) struct SupervisorInner {
    pub(crate) config: ConfigFile,
    pub(crate) job: Mutex<ExecutionJob>,
}

impl SupervisorInner {
    /// Lock the job record, recovering from a poisoned lock (a panicking
    /// worker must not wedge status polling forever).
    pub(crate) fn lock_job(&self) -> MutexGuard<'_, ExecutionJob> {
        self.job.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle to the execution orchestration core. Cheap to clone; all clones
/// share the same job record.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

impl Supervisor {
    pub fn new(config: ConfigFile) -> Self {
        let job = ExecutionJob::new(config.job.log_capacity);
        Self {
            inner: Arc::new(SupervisorInner {
                config,
                job: Mutex::new(job),
            }),
        }
    }

    /// Accept and dispatch a run.
    ///
    /// Fails synchronously with [`RoborunError::RunInProgress`] while a run
    /// is active (the job record is left untouched) or with
    /// [`RoborunError::ConfigError`] when the test root has gone missing.
    /// On success the job is reset to `Running` and execution continues on a
    /// background task; all later faults resolve through the polled status,
    /// never as errors from this method.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, spec: RunSpec) -> Result<()> {
        let config = &self.inner.config;

        if !config.runner.test_root.is_dir() {
            return Err(RoborunError::ConfigError(format!(
                "test root {:?} is not an existing directory",
                config.runner.test_root
            )));
        }

        let mut job = self.inner.lock_job();
        if job.status == JobStatus::Running {
            return Err(RoborunError::RunInProgress);
        }

        // Fresh output directory. A stopped previous run leaves its output
        // behind, so clear any leftovers before the runner starts writing.
        let output_dir = &config.paths.output_dir;
        if output_dir.exists() {
            fs::remove_dir_all(output_dir)?;
        }
        fs::create_dir_all(output_dir)?;

        let mut variable_file = None;
        let mut sorted_dataset = None;
        if let RunSpec::DataDriven { ref dataset } = spec {
            let sorted = dataset::sort_by_priority(dataset);
            let path = output_dir.join("variables.py");
            dataset::write_variable_file(&path, &sorted)?;
            variable_file = Some(path);
            sorted_dataset = Some(sorted);
        }

        let invocation = exec::build_invocation(config, &spec, variable_file);

        job.reset_for_run();
        job.dataset = sorted_dataset;
        job.logs.push(format!(
            "$ {} {}",
            invocation.program,
            invocation.args.join(" ")
        ));
        drop(job);

        info!(program = %invocation.program, "run accepted; dispatching to worker");
        tokio::spawn(worker::run(Arc::clone(&self.inner), invocation));

        Ok(())
    }

    /// Request that the active run stops.
    ///
    /// Marks the job `Stopped` optimistically and signals the runner's
    /// process group; does not wait for the process to exit. The worker
    /// observes the flag and finalizes without overwriting `Stopped`. If
    /// the group ignores SIGTERM for the configured grace period, an
    /// escalation task SIGKILLs it.
    pub fn stop(&self) -> StopOutcome {
        let mut job = self.inner.lock_job();
        if job.status != JobStatus::Running {
            debug!("stop requested but no run is active");
            return StopOutcome::NotRunning;
        }

        job.status = JobStatus::Stopped;
        job.logs.push("Stop requested; terminating runner.".to_string());
        let pgid = job.pgid;
        drop(job);

        // pgid is None while the worker is still between accept and spawn;
        // in that window the worker itself terminates the fresh group after
        // re-checking the status flag.
        if let Some(pgid) = pgid {
            exec::terminate_group(pgid);
            self.spawn_kill_escalation(pgid);
        }

        info!(?pgid, "stop signalled");
        StopOutcome::Signalled
    }

    /// Immutable snapshot of the job record. Safe under concurrent callers
    /// and never blocks on the execution path.
    pub fn status(&self) -> JobSnapshot {
        self.inner.lock_job().snapshot()
    }

    fn spawn_kill_escalation(&self, pgid: i32) {
        let inner = Arc::clone(&self.inner);
        let grace = Duration::from_secs(inner.config.runner.stop_grace_secs);

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            // Only escalate if the same process group is still registered;
            // the worker clears the handle once the exit is observed.
            let still_active = inner.lock_job().pgid == Some(pgid);
            if still_active {
                warn!(pgid, "runner did not exit within the stop grace period; sending SIGKILL");
                exec::kill_group(pgid);
            }
        });
    }
}
