//! Shared fixtures for integration tests: a temp directory laid out the way
//! the supervisor expects, plus small shell scripts standing in for the real
//! runner binary.

use std::fs;
use std::path::{Path, PathBuf};

use roborun::config::{ConfigFile, JobSection, PathsSection, RawConfigFile, RunnerSection};
use tempfile::TempDir;

/// One self-contained environment per test: a temp dir holding the test
/// root, output/archive directories and a stub runner script, tied together
/// by a validated [`ConfigFile`].
///
/// Everything is removed when the `TestEnv` is dropped.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: ConfigFile,
}

impl TestEnv {
    /// Build an environment whose runner is a shell script running `body`.
    ///
    /// The script prelude parses `--outputdir <dir>` out of the argument
    /// list, creates that directory and exposes it to `body` as `$out`.
    pub fn with_runner_body(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let test_root = dir.path().join("tests");
        fs::create_dir_all(&test_root).expect("create test root");

        let runner = write_stub_runner(dir.path(), body);

        let raw = RawConfigFile {
            runner: RunnerSection {
                binary: runner.to_string_lossy().into_owned(),
                test_root,
                stop_grace_secs: 1,
            },
            paths: PathsSection {
                output_dir: dir.path().join("out"),
                archive_dir: dir.path().join("archive"),
                video_dir: None,
            },
            job: JobSection { log_capacity: 1000 },
        };
        let config = ConfigFile::try_from(raw).expect("valid test config");

        Self { dir, config }
    }

    /// An environment whose runner emits a couple of log lines, writes a
    /// results document (3 passed, 1 failed) plus report/log pages, and
    /// exits with `exit_code`.
    pub fn with_completing_runner(exit_code: i32) -> Self {
        let body = format!(
            r#"echo "suite start"
echo "suite end"
cat > "$out/output.json" <<'EOF'
{}
EOF
echo "<html>report</html>" > "$out/report.html"
echo "<html>log</html>" > "$out/log.html"
exit {exit_code}
"#,
            sample_output_json(3, 1),
        );
        Self::with_runner_body(&body)
    }

    /// An environment whose runner sleeps until killed. Used by stop tests.
    pub fn with_hanging_runner() -> Self {
        Self::with_runner_body("echo \"hanging\"\nsleep 600\n")
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.paths.output_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.config.paths.archive_dir
    }
}

/// Write an executable `runner.sh` into `dir` and return its path.
pub fn write_stub_runner(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("runner.sh");
    let script = format!(
        r#"#!/bin/sh
out=""
prev=""
for a in "$@"; do
    if [ "$prev" = "--outputdir" ]; then out="$a"; fi
    prev="$a"
done
mkdir -p "$out"
{body}
"#
    );
    fs::write(&path, script).expect("write stub runner");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("mark stub runner executable");
    }

    path
}

/// A minimal results document in the shape the stats extractor reads.
pub fn sample_output_json(pass: u32, fail: u32) -> String {
    format!(
        r#"{{"statistics": {{"total": {{"pass": {pass}, "fail": {fail}}}}}, "tests": []}}"#
    )
}
