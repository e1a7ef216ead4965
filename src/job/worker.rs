// src/job/worker.rs

//! The background execution path for one accepted run.
//!
//! The worker exclusively owns the runner process for its lifetime: it
//! spawns it, drains its merged output into the log sink, waits for the
//! exit, and finalizes the job. Every fault resolves to a terminal job
//! status — a run is never left `Running`, and a manual `Stopped` mark is
//! never overwritten.

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::archive;
use crate::exec::{self, RunnerInvocation};
use crate::job::supervisor::SupervisorInner;
use crate::stats;
use crate::types::JobStatus;

pub(crate) async fn run(inner: Arc<SupervisorInner>, invocation: RunnerInvocation) {
    match drive(&inner, &invocation).await {
        Ok(exit_code) => finalize_exit(&inner, exit_code),
        Err(fault) => finalize_fault(&inner, fault),
    }
}

/// Spawn, stream and wait. Returns the runner's exit code.
async fn drive(inner: &Arc<SupervisorInner>, invocation: &RunnerInvocation) -> anyhow::Result<i32> {
    info!(program = %invocation.program, "starting runner process");

    let mut running = exec::spawn_runner(invocation)
        .with_context(|| format!("spawning runner '{}'", invocation.program))?;

    // Register the process handle. A stop request may already have raced
    // in between accept and spawn; in that case terminate the fresh group
    // right away instead of letting it run unnoticed.
    {
        let mut job = inner.lock_job();
        job.pgid = running.pgid;
        if job.status == JobStatus::Stopped {
            if let Some(pgid) = running.pgid {
                debug!(pgid, "stop raced ahead of spawn; terminating fresh process group");
                exec::terminate_group(pgid);
            }
        }
    }

    // The runner reads variable files while starting up; once the spawn has
    // been confirmed the handoff is complete and the transient file can go.
    if let Some(ref path) = invocation.variable_file {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove transient variable file");
        }
    }

    // Lines arrive in the order the process produced them (per stream) and
    // are appended immediately, so pollers see progress in near real time.
    // The channel closes when both output streams hit EOF.
    while let Some(line) = running.lines.recv().await {
        inner.lock_job().logs.push(line);
    }

    let status = running
        .child
        .wait()
        .await
        .context("waiting for runner process")?;
    let code = status.code().unwrap_or(-1);

    info!(exit_code = code, "runner process exited");

    let mut job = inner.lock_job();
    job.return_code = Some(code);
    // Release the handle: the group is gone, the escalation task must not
    // signal a reused pgid.
    job.pgid = None;

    Ok(code)
}

/// Normal exit: extract statistics, archive artifacts and write the
/// terminal status — unless the run was manually stopped, in which case
/// `Stopped` stands and the output directory is left in place.
fn finalize_exit(inner: &Arc<SupervisorInner>, exit_code: i32) {
    if inner.lock_job().status == JobStatus::Stopped {
        info!("run was stopped; skipping stats and archiving");
        inner.lock_job().logs.push("Run stopped.".to_string());
        return;
    }

    let config = &inner.config;
    let results = config.paths.output_dir.join("output.json");
    let (pass, fail) = stats::extract_counts(&results);

    let archived = archive::archive_run(
        &config.paths.output_dir,
        &config.video_dir(),
        &config.paths.archive_dir,
    );

    let mut job = inner.lock_job();
    // A stop that landed while we were archiving still wins.
    if job.status == JobStatus::Stopped {
        job.logs.push("Run stopped.".to_string());
        return;
    }

    job.pass_count = pass;
    job.fail_count = fail;
    job.report_file = archived.report;
    job.log_file = archived.log;
    job.video_file = archived.video;
    job.status = if exit_code == 0 {
        JobStatus::Success
    } else {
        JobStatus::Failed
    };
    job.logs.push(format!(
        "Run finished with exit code {exit_code} ({pass} passed, {fail} failed)."
    ));

    info!(status = ?job.status, pass, fail, "run finalized");
}

/// Launch failure or an unexpected fault while streaming/waiting: resolve
/// to `Failed` with a diagnostic log line instead of leaving the job stuck
/// in `Running`.
fn finalize_fault(inner: &Arc<SupervisorInner>, fault: anyhow::Error) {
    error!(error = %format!("{fault:#}"), "run execution fault");

    let mut job = inner.lock_job();
    job.pgid = None;

    if job.status == JobStatus::Stopped {
        debug!("fault after stop request; keeping Stopped status");
        return;
    }

    job.logs.push(format!("ERROR: {fault:#}"));
    job.status = JobStatus::Failed;
}
