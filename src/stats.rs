// src/stats.rs

//! Pass/fail extraction from the runner's results document.
//!
//! The runner is asked to write a machine-readable `output.json` next to its
//! HTML report. The preferred source of counts is the aggregate
//! `statistics.total` node; if that node is absent the individual `tests`
//! entries are tallied by their status label. A missing or unreadable
//! document yields `(0, 0)` — results are advisory, their absence is not a
//! job failure.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

/// Extract `(pass, fail)` from the results document at `path`.
pub fn extract_counts(path: &Path) -> (u32, u32) {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no results document; counts default to zero");
            return (0, 0);
        }
    };

    counts_from_document(&contents).unwrap_or_else(|| {
        warn!(path = %path.display(), "results document is malformed; counts default to zero");
        (0, 0)
    })
}

/// Parse counts out of the document text. `None` means the document could
/// not be interpreted at all.
pub fn counts_from_document(contents: &str) -> Option<(u32, u32)> {
    let doc: Value = serde_json::from_str(contents).ok()?;

    if let Some(counts) = aggregate_total(&doc) {
        return Some(counts);
    }

    tally_test_entries(&doc)
}

/// The aggregate "all tests" node: `statistics.total.{pass,fail}`.
fn aggregate_total(doc: &Value) -> Option<(u32, u32)> {
    let total = doc.get("statistics")?.get("total")?;
    let pass = total.get("pass")?.as_u64()?;
    let fail = total.get("fail")?.as_u64()?;
    Some((pass as u32, fail as u32))
}

/// Fallback: iterate the individual `tests` entries and tally by status
/// label.
fn tally_test_entries(doc: &Value) -> Option<(u32, u32)> {
    let tests = doc.get("tests")?.as_array()?;

    let mut pass = 0u32;
    let mut fail = 0u32;
    for entry in tests {
        match entry.get("status").and_then(Value::as_str) {
            Some("PASS") => pass += 1,
            Some("FAIL") => fail += 1,
            _ => {}
        }
    }

    Some((pass, fail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_total_is_preferred() {
        let doc = r#"{
            "statistics": {"total": {"pass": 3, "fail": 1}},
            "tests": [{"status": "PASS"}]
        }"#;
        assert_eq!(counts_from_document(doc), Some((3, 1)));
    }

    #[test]
    fn falls_back_to_tallying_entries() {
        let doc = r#"{
            "tests": [
                {"name": "a", "status": "PASS"},
                {"name": "b", "status": "FAIL"},
                {"name": "c", "status": "PASS"},
                {"name": "d", "status": "SKIP"}
            ]
        }"#;
        assert_eq!(counts_from_document(doc), Some((2, 1)));
    }

    #[test]
    fn unusable_document_yields_none() {
        assert_eq!(counts_from_document("not json"), None);
        assert_eq!(counts_from_document("{}"), None);
    }

    #[test]
    fn missing_file_degrades_to_zero_counts() {
        let path = Path::new("/definitely/not/here/output.json");
        assert_eq!(extract_counts(path), (0, 0));
    }
}
