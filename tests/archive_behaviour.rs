// tests/archive_behaviour.rs

mod common;

use std::fs;
use std::path::Path;

use common::init_tracing;
use roborun::archive::archive_run;

fn make_output_dir(root: &Path) -> std::path::PathBuf {
    let output = root.join("out");
    fs::create_dir_all(&output).unwrap();
    output
}

#[test]
fn archives_all_three_kinds_and_removes_output_dir() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = make_output_dir(dir.path());
    let videos = output.join("videos");
    let archive = dir.path().join("archive");
    fs::create_dir_all(&videos).unwrap();
    fs::write(output.join("report.html"), "<html>report</html>").unwrap();
    fs::write(output.join("log.html"), "<html>log</html>").unwrap();
    fs::write(videos.join("run.mp4"), [0u8; 4]).unwrap();

    let archived = archive_run(&output, &videos, &archive);

    let report = archived.report.expect("report archived");
    let log = archived.log.expect("log archived");
    let video = archived.video.expect("video archived");
    assert!(report.starts_with("report-") && report.ends_with(".html"));
    assert!(log.starts_with("log-") && log.ends_with(".html"));
    assert!(video.starts_with("video-") && video.ends_with(".mp4"));

    assert!(archive.join(&report).is_file());
    assert!(archive.join(&log).is_file());
    assert!(archive.join(&video).is_file());
    assert!(!output.exists());
}

#[test]
fn missing_video_does_not_block_the_other_kinds() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = make_output_dir(dir.path());
    let archive = dir.path().join("archive");
    fs::write(output.join("report.html"), "<html>report</html>").unwrap();
    fs::write(output.join("log.html"), "<html>log</html>").unwrap();

    // Video dir does not exist at all.
    let archived = archive_run(&output, &output.join("videos"), &archive);

    assert!(archived.report.is_some());
    assert!(archived.log.is_some());
    assert!(archived.video.is_none());
    assert!(!output.exists());
}

#[test]
fn timestamped_documents_are_picked_up_by_prefix() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = make_output_dir(dir.path());
    let archive = dir.path().join("archive");
    // No report.html; the runner was configured with timestamped names.
    fs::write(output.join("report-20260827.html"), "<html>report</html>").unwrap();
    fs::write(output.join("log-20260827.html"), "<html>log</html>").unwrap();

    let archived = archive_run(&output, &output.join("videos"), &archive);

    assert!(archived.report.is_some());
    assert!(archived.log.is_some());
}

#[test]
fn unusable_archive_dir_skips_archiving_but_still_cleans_up() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let output = make_output_dir(dir.path());
    fs::write(output.join("report.html"), "<html>report</html>").unwrap();

    // A plain file where the archive directory should go.
    let archive = dir.path().join("archive");
    fs::write(&archive, "occupied").unwrap();

    let archived = archive_run(&output, &output.join("videos"), &archive);

    assert!(archived.report.is_none());
    assert!(archived.log.is_none());
    assert!(archived.video.is_none());
    assert!(!output.exists());
}
