// tests/common/mod.rs

#![allow(dead_code)]

pub use roborun_test_utils::harness::{sample_output_json, write_stub_runner, TestEnv};
pub use roborun_test_utils::{init_tracing, with_timeout};

use std::time::Duration;

use roborun::job::{JobSnapshot, Supervisor};

/// Poll the supervisor until `pred` holds for the current snapshot.
///
/// Callers wrap this in [`with_timeout`] so a stuck run fails the test
/// instead of hanging it.
pub async fn wait_until(
    supervisor: &Supervisor,
    pred: impl Fn(&JobSnapshot) -> bool,
) -> JobSnapshot {
    loop {
        let snapshot = supervisor.status();
        if pred(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

pub async fn wait_until_terminal(supervisor: &Supervisor) -> JobSnapshot {
    wait_until(supervisor, |s| s.status.is_terminal()).await
}

/// Like [`wait_until_terminal`], but also waits for the worker to have
/// observed the process exit. A stop request marks the job terminal before
/// the runner is gone.
pub async fn wait_until_reaped(supervisor: &Supervisor) -> JobSnapshot {
    wait_until(supervisor, |s| s.status.is_terminal() && s.return_code.is_some()).await
}
