// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::errors::{Result, RoborunError};
use crate::types::RunSpec;

/// Command-line arguments for `roborun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "roborun",
    version,
    about = "Run Robot Framework suites as a supervised background job.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Roborun.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Roborun.toml")]
    pub config: String,

    /// Comma-separated tags a test must carry to be included.
    #[arg(long, value_name = "TAGS", conflicts_with_all = ["suite", "test_case"])]
    pub include_tags: Option<String>,

    /// Comma-separated tags that exclude a test from the run.
    #[arg(long, value_name = "TAGS", conflicts_with_all = ["suite", "test_case"])]
    pub exclude_tags: Option<String>,

    /// Run a single suite file, given relative to the configured test root.
    ///
    /// A suite is a single execution target, so this conflicts with the tag
    /// filters and with `--test-case`.
    #[arg(long, value_name = "PATH", conflicts_with = "test_case")]
    pub suite: Option<String>,

    /// Run a single test case by name.
    #[arg(long, value_name = "NAME")]
    pub test_case: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ROBORUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Translate the selection flags into a [`RunSpec`].
    ///
    /// Data-driven runs are a library-level concern (the dataset comes from a
    /// collaborator, not the command line), so the CLI only covers the other
    /// four modes.
    pub fn run_spec(&self) -> Result<RunSpec> {
        if let Some(ref suite) = self.suite {
            if suite.trim().is_empty() {
                return Err(RoborunError::ConfigError(
                    "--suite requires a non-empty path".to_string(),
                ));
            }
            return Ok(RunSpec::BySuite {
                suite: suite.clone(),
            });
        }

        if let Some(ref name) = self.test_case {
            if name.trim().is_empty() {
                return Err(RoborunError::ConfigError(
                    "--test-case requires a non-empty name".to_string(),
                ));
            }
            return Ok(RunSpec::ByTestCase { name: name.clone() });
        }

        if self.include_tags.is_some() || self.exclude_tags.is_some() {
            return Ok(RunSpec::ByTag {
                include: self.include_tags.clone(),
                exclude: self.exclude_tags.clone(),
            });
        }

        Ok(RunSpec::AllTests)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
