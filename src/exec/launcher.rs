// src/exec/launcher.rs

//! Spawning and supervising the external runner process.
//!
//! The runner is started in its own process group so that any children it
//! spawns (browsers, drivers) are reachable for termination. Its stdout and
//! stderr are read line by line as data arrives and forwarded over a bounded
//! channel, so polling callers observe progress in near real time instead of
//! at exit.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::types::RunSpec;

/// Fully built invocation of the external runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Transient variable file for data-driven runs; deleted by the worker
    /// once the process is confirmed started.
    pub variable_file: Option<PathBuf>,
}

/// Build the runner's argument vector from the run specification.
///
/// Every invocation writes into the configured output directory and emits a
/// machine-readable `output.json` results document alongside the HTML
/// report; the selection mode decides the filters and the target path.
pub fn build_invocation(
    config: &ConfigFile,
    spec: &RunSpec,
    variable_file: Option<PathBuf>,
) -> RunnerInvocation {
    let mut args: Vec<String> = vec![
        "--outputdir".to_string(),
        config.paths.output_dir.display().to_string(),
        "--output".to_string(),
        "output.json".to_string(),
    ];

    let mut target = config.runner.test_root.clone();

    match spec {
        RunSpec::AllTests => {}
        RunSpec::ByTag { include, exclude } => {
            if let Some(tags) = include {
                args.push("-i".to_string());
                args.push(tags.clone());
            }
            if let Some(tags) = exclude {
                args.push("-e".to_string());
                args.push(tags.clone());
            }
        }
        RunSpec::BySuite { suite } => {
            target = config.runner.test_root.join(suite);
        }
        RunSpec::ByTestCase { name } => {
            args.push("--test".to_string());
            args.push(name.clone());
        }
        RunSpec::DataDriven { .. } => {
            if let Some(ref path) = variable_file {
                args.push("--variablefile".to_string());
                args.push(path.display().to_string());
            }
        }
    }

    args.push(target.display().to_string());

    RunnerInvocation {
        program: config.runner.binary.clone(),
        args,
        variable_file,
    }
}

/// A spawned runner process.
///
/// `lines` carries the merged stdout/stderr output; it closes once both
/// streams reach EOF. `pgid` is the process group to signal for
/// cancellation (equal to the child pid, since the child leads its own
/// group).
pub struct RunningRunner {
    pub child: Child,
    pub pgid: Option<i32>,
    pub lines: mpsc::Receiver<String>,
}

/// Spawn the runner described by `invocation`.
///
/// Spawn failure (binary missing, not executable) is returned to the caller,
/// which reports it through the job record rather than crashing.
pub fn spawn_runner(invocation: &RunnerInvocation) -> std::io::Result<RunningRunner> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Lead a fresh process group so group-level signals reach the runner's
    // own children as well.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn()?;

    let pgid = child.id().map(|pid| pid as i32);

    let (tx, rx) = mpsc::channel::<String>(256);

    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx);
    }

    Ok(RunningRunner {
        child,
        pgid,
        lines: rx,
    })
}

/// Forward non-empty lines from one output stream into the merged channel
/// as they arrive.
fn forward_lines(stream: impl AsyncRead + Unpin + Send + 'static, tx: mpsc::Sender<String>) {
    tokio::spawn(async move {
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(line).await.is_err() {
                // Receiver gone; stop draining.
                break;
            }
        }
    });
}

/// Ask the whole process group to terminate (SIGTERM).
pub fn terminate_group(pgid: i32) {
    signal_group(pgid, GroupSignal::Terminate);
}

/// Forcefully kill the whole process group (SIGKILL). Used after the stop
/// grace period elapses without the group exiting.
pub fn kill_group(pgid: i32) {
    signal_group(pgid, GroupSignal::Kill);
}

enum GroupSignal {
    Terminate,
    Kill,
}

#[cfg(unix)]
fn signal_group(pgid: i32, signal: GroupSignal) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let sig = match signal {
        GroupSignal::Terminate => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    };

    match killpg(Pid::from_raw(pgid), sig) {
        Ok(()) => debug!(pgid, signal = %sig, "signalled runner process group"),
        Err(e) => warn!(pgid, signal = %sig, error = %e, "failed to signal runner process group"),
    }
}

#[cfg(not(unix))]
fn signal_group(pgid: i32, _signal: GroupSignal) {
    warn!(pgid, "process group signalling is not supported on this platform");
}
