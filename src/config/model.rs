// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as deserialized from a TOML file, before semantic
/// validation:
///
/// ```toml
/// [runner]
/// binary = "robot"
/// test_root = "tests"
/// stop_grace_secs = 5
///
/// [paths]
/// output_dir = "robot-output"
/// archive_dir = "archive"
/// video_dir = "videos"
///
/// [job]
/// log_capacity = 1000
/// ```
///
/// All sections are optional and have reasonable defaults, except that
/// `runner.test_root` must point at an existing directory (checked in
/// `validate.rs`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// External runner settings from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,

    /// Directory layout from `[paths]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Job-record settings from `[job]`.
    #[serde(default)]
    pub job: JobSection,
}

/// Validated configuration used by the rest of the crate.
///
/// Constructed via `TryFrom<RawConfigFile>` (see `validate.rs`), which is the
/// only place allowed to call [`ConfigFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub paths: PathsSection,
    pub job: JobSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerSection,
        paths: PathsSection,
        job: JobSection,
    ) -> Self {
        Self { runner, paths, job }
    }

    /// Effective recordings directory: the configured one, or a `videos`
    /// subdirectory of the output dir. The configured form may sit outside
    /// the output tree entirely (e.g. a browser-library recording dir).
    pub fn video_dir(&self) -> PathBuf {
        match self.paths.video_dir {
            Some(ref dir) => dir.clone(),
            None => self.paths.output_dir.join("videos"),
        }
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// The external runner executable.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Directory containing the test definitions. Must exist.
    #[serde(default)]
    pub test_root: PathBuf,

    /// How long a stop request waits for SIGTERM to take effect before the
    /// process group is SIGKILLed.
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,
}

fn default_binary() -> String {
    "robot".to_string()
}

fn default_stop_grace_secs() -> u64 {
    5
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            test_root: PathBuf::new(),
            stop_grace_secs: default_stop_grace_secs(),
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Ephemeral directory the runner writes into; recreated per run and
    /// deleted after archiving.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Durable directory archived artifacts are moved into.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Optional recordings directory; see [`ConfigFile::video_dir`].
    #[serde(default)]
    pub video_dir: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("robot-output")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archive")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            archive_dir: default_archive_dir(),
            video_dir: None,
        }
    }
}

/// `[job]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSection {
    /// Capacity of the bounded live-log FIFO; oldest lines are evicted first.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_log_capacity() -> usize {
    1000
}

impl Default for JobSection {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gets_defaults() {
        let raw: RawConfigFile = toml::from_str("").unwrap();
        assert_eq!(raw.runner.binary, "robot");
        assert_eq!(raw.runner.stop_grace_secs, 5);
        assert_eq!(raw.paths.output_dir, PathBuf::from("robot-output"));
        assert_eq!(raw.paths.archive_dir, PathBuf::from("archive"));
        assert!(raw.paths.video_dir.is_none());
        assert_eq!(raw.job.log_capacity, 1000);
    }

    #[test]
    fn video_dir_defaults_under_output_dir() {
        let raw: RawConfigFile = toml::from_str("").unwrap();
        let cfg = ConfigFile::new_unchecked(raw.runner, raw.paths, raw.job);
        assert_eq!(cfg.video_dir(), PathBuf::from("robot-output/videos"));
    }
}
