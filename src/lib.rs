// src/lib.rs

pub mod archive;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod stats;
pub mod types;

use std::time::Duration;

use anyhow::anyhow;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::errors::Result;
use crate::job::{StopOutcome, Supervisor};
use crate::types::JobStatus;

/// High-level entry point used by `main.rs`: one-shot run from the command
/// line.
///
/// This wires together:
/// - config loading
/// - the job supervisor
/// - Ctrl-C → stop request
/// - a status poll loop that prints runner output as it arrives
///
/// The web dashboard that normally drives the supervisor talks to the same
/// three operations (`start`/`stop`/`status`); it lives outside this crate.
pub async fn run(args: CliArgs) -> Result<()> {
    let config = load_and_validate(&args.config)?;
    let spec = args.run_spec()?;

    let supervisor = Supervisor::new(config);
    supervisor.start(spec)?;

    // Ctrl-C → stop the active run instead of abandoning the process group.
    {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            match supervisor.stop() {
                StopOutcome::Signalled => info!("Ctrl-C: stop signalled"),
                StopOutcome::NotRunning => {}
            }
        });
    }

    let snapshot = poll_until_terminal(&supervisor).await;

    println!();
    println!("status: {:?}", snapshot.status);
    println!("passed: {}  failed: {}", snapshot.pass_count, snapshot.fail_count);
    for (label, file) in [
        ("report", &snapshot.report_file),
        ("log", &snapshot.log_file),
        ("video", &snapshot.video_file),
    ] {
        if let Some(name) = file {
            println!("archived {label}: {name}");
        }
    }

    match snapshot.status {
        JobStatus::Failed => Err(anyhow!(
            "test run failed ({} failed test(s), exit code {:?})",
            snapshot.fail_count,
            snapshot.return_code
        )
        .into()),
        _ => Ok(()),
    }
}

/// Poll the supervisor, echoing newly appended log lines, until the job
/// reaches a terminal state.
async fn poll_until_terminal(supervisor: &Supervisor) -> job::JobSnapshot {
    let mut printed = 0usize;

    loop {
        let snapshot = supervisor.status();

        // If the bounded log buffer wrapped between polls, indices shifted;
        // re-print the current window rather than guessing the overlap.
        if snapshot.log_lines.len() < printed {
            printed = 0;
        }
        for line in &snapshot.log_lines[printed..] {
            println!("{line}");
        }
        printed = snapshot.log_lines.len();

        if snapshot.status.is_terminal() {
            return snapshot;
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
