// src/archive.rs

//! Post-run artifact archiving.
//!
//! After a (non-stopped) run finishes, the first artifact of each recognized
//! kind is moved out of the ephemeral output directory into durable archive
//! storage under a timestamp-qualified name, and the output directory is
//! then deleted. Every error along the way is logged and swallowed: a failed
//! move for one kind must not block the others, and none of it may change
//! the job's terminal status.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

/// Recording file extensions the archiver recognizes.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "webm", "mkv"];

/// Archived filenames for one run, as recorded on the job. These names are
/// the registry of what was preserved; nothing is recovered later by parsing
/// the archive directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivedArtifacts {
    pub report: Option<String>,
    pub log: Option<String>,
    pub video: Option<String>,
}

/// Archive the artifacts of a finished run and delete the output directory.
pub fn archive_run(output_dir: &Path, video_dir: &Path, archive_dir: &Path) -> ArchivedArtifacts {
    let mut archived = ArchivedArtifacts::default();

    if let Err(e) = fs::create_dir_all(archive_dir) {
        warn!(dir = %archive_dir.display(), error = %e, "cannot create archive directory; skipping archiving");
        remove_output_dir(output_dir);
        return archived;
    }

    let timestamp = Local::now().format("%Y%m%d-%H%M%S%3f").to_string();

    archived.report = archive_one(
        find_document(output_dir, "report"),
        archive_dir,
        "report",
        &timestamp,
    );
    archived.log = archive_one(
        find_document(output_dir, "log"),
        archive_dir,
        "log",
        &timestamp,
    );
    archived.video = archive_one(find_video(video_dir), archive_dir, "video", &timestamp);

    remove_output_dir(output_dir);

    archived
}

/// Locate the primary HTML document of a kind: the runner's default name
/// first (`report.html` / `log.html`), otherwise the first `.html` file
/// whose name starts with the kind prefix.
fn find_document(dir: &Path, kind: &str) -> Option<PathBuf> {
    let default = dir.join(format!("{kind}.html"));
    if default.is_file() {
        return Some(default);
    }

    first_match(dir, |name| {
        name.starts_with(kind) && name.ends_with(".html")
    })
}

/// Locate one recording with a recognized extension.
fn find_video(dir: &Path) -> Option<PathBuf> {
    first_match(dir, |name| {
        name.rsplit_once('.')
            .is_some_and(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    })
}

fn first_match(dir: &Path, pred: impl Fn(&str) -> bool) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return None,
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(&pred)
        })
        .collect();

    // Directory iteration order is platform-dependent; sort so "first" is
    // deterministic.
    candidates.sort();
    candidates.into_iter().next()
}

/// Move one artifact into the archive under `{kind}-{timestamp}.{ext}`,
/// returning the archived filename on success.
fn archive_one(
    source: Option<PathBuf>,
    archive_dir: &Path,
    kind: &str,
    timestamp: &str,
) -> Option<String> {
    let source = source?;

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_string();

    let name = unique_name(archive_dir, kind, timestamp, &ext);
    let dest = archive_dir.join(&name);

    match move_file(&source, &dest) {
        Ok(()) => {
            info!(kind, from = %source.display(), to = %dest.display(), "archived artifact");
            Some(name)
        }
        Err(e) => {
            warn!(kind, from = %source.display(), error = %e, "failed to archive artifact");
            None
        }
    }
}

/// `{kind}-{timestamp}.{ext}`, bumping a numeric suffix in the unlikely case
/// the name is already taken.
fn unique_name(archive_dir: &Path, kind: &str, timestamp: &str, ext: &str) -> String {
    let base = format!("{kind}-{timestamp}.{ext}");
    if !archive_dir.join(&base).exists() {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{kind}-{timestamp}-{n}.{ext}");
        if !archive_dir.join(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Rename, falling back to copy + remove when source and destination sit on
/// different filesystems.
fn move_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, dest)?;
            fs::remove_file(source)?;
            Ok(())
        }
    }
}

fn remove_output_dir(output_dir: &Path) {
    match fs::remove_dir_all(output_dir) {
        Ok(()) => debug!(dir = %output_dir.display(), "removed ephemeral output directory"),
        Err(e) => warn!(dir = %output_dir.display(), error = %e, "failed to remove output directory"),
    }
}
