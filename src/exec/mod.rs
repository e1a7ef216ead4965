// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external test runner,
//! using `tokio::process::Command`:
//!
//! - [`launcher`] builds the runner's argument vector from a [`crate::types::RunSpec`],
//!   spawns the process as its own process group, streams its merged
//!   stdout/stderr line by line, and exposes group-level termination.

pub mod launcher;

pub use launcher::{
    build_invocation, kill_group, spawn_runner, terminate_group, RunnerInvocation, RunningRunner,
};
