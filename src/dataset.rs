// src/dataset.rs

//! Data-driven run preparation.
//!
//! Turns a tabular dataset into the variable file the external runner reads
//! at startup. Rows are first reordered by the `priority` column (if one
//! exists), then rendered as:
//!
//! - one flat variable per header, taken from the first row of the reordered
//!   dataset (single-shot parameterized runs), and
//! - the full reordered dataset as `DATASET`, a list of dicts keyed by
//!   sanitized header names (iteration-based runs).

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::types::Dataset;

/// Rank below all recognized priority tokens; unrecognized or missing values
/// sort after P0..P3.
const UNRANKED: u8 = 4;

fn priority_rank(value: &str) -> u8 {
    match value.trim().to_uppercase().as_str() {
        "P0" => 0,
        "P1" => 1,
        "P2" => 2,
        "P3" => 3,
        _ => UNRANKED,
    }
}

/// Find the index of the priority column, matching the header
/// case-insensitively.
fn priority_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("priority"))
}

/// Reorder rows by priority: `P0 < P1 < P2 < P3 <` everything else.
///
/// The sort is stable, so rows with equal priority keep their original
/// relative order; that ordering is user-visible in the generated variable
/// file. A dataset without a priority column is returned in input order.
pub fn sort_by_priority(dataset: &Dataset) -> Dataset {
    let Some(col) = priority_column(&dataset.headers) else {
        info!("dataset has no priority column; keeping original row order");
        return dataset.clone();
    };

    let mut rows = dataset.rows.clone();
    rows.sort_by_key(|row| row.get(col).map(|v| priority_rank(v)).unwrap_or(UNRANKED));

    debug!(rows = rows.len(), "dataset rows reordered by priority");

    Dataset {
        headers: dataset.headers.clone(),
        rows,
    }
}

/// Make a header usable as a variable identifier: every character outside
/// `[A-Za-z0-9_]` becomes an underscore, and a leading digit is escaped with
/// an underscore prefix.
pub fn sanitize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len() + 1);

    if header.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.push('_');
    }

    for c in header.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    out
}

fn python_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Render the Python variable-file source for an already-reordered dataset.
///
/// Rows shorter than the header list are padded with empty values.
pub fn render_variable_file(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str("# Generated variable file for a data-driven run.\n");

    let first_row: &[String] = dataset.rows.first().map(Vec::as_slice).unwrap_or(&[]);
    for (idx, header) in dataset.headers.iter().enumerate() {
        out.push_str(&format!(
            "{} = {}\n",
            sanitize_header(header),
            python_str(cell(first_row, idx))
        ));
    }

    out.push_str("\nDATASET = [\n");
    for row in &dataset.rows {
        out.push_str("    {");
        for (idx, header) in dataset.headers.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!(
                "{}: {}",
                python_str(&sanitize_header(header)),
                python_str(cell(row, idx))
            ));
        }
        out.push_str("},\n");
    }
    out.push_str("]\n");

    out
}

/// Write the variable file for an already-reordered dataset.
///
/// The file is transient: the worker deletes it once the runner process has
/// been spawned (the runner reads variable files during startup).
pub fn write_variable_file(path: &Path, dataset: &Dataset) -> std::io::Result<()> {
    fs::write(path, render_variable_file(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn priority_sort_is_stable() {
        let input = dataset(
            &["Name", "Priority"],
            &[
                &["r0", "P2"],
                &["r1", "P0"],
                &["r2", "P3"],
                &["r3", "P0"],
                &["r4", "P1"],
            ],
        );

        let sorted = sort_by_priority(&input);
        let names: Vec<&str> = sorted.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["r1", "r3", "r4", "r0", "r2"]);
    }

    #[test]
    fn unrecognized_priorities_sort_last_in_original_order() {
        let input = dataset(
            &["Name", "priority"],
            &[
                &["r0", "urgent"],
                &["r1", "P1"],
                &["r2", ""],
                &["r3", "p0"],
            ],
        );

        let sorted = sort_by_priority(&input);
        let names: Vec<&str> = sorted.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["r3", "r1", "r0", "r2"]);
    }

    #[test]
    fn missing_priority_column_keeps_input_order() {
        let input = dataset(&["Env"], &[&["b"], &["a"]]);
        let sorted = sort_by_priority(&input);
        assert_eq!(sorted, input);
    }

    #[test]
    fn sanitize_replaces_invalid_chars_and_escapes_leading_digit() {
        assert_eq!(sanitize_header("Env"), "Env");
        assert_eq!(sanitize_header("User Name"), "User_Name");
        assert_eq!(sanitize_header("e-mail.addr"), "e_mail_addr");
        assert_eq!(sanitize_header("2fa"), "_2fa");
    }

    #[test]
    fn variable_file_uses_first_row_after_sort() {
        let input = dataset(
            &["Env", "Priority"],
            &[&["prod", "P1"], &["stage", "P0"]],
        );

        let rendered = render_variable_file(&sort_by_priority(&input));
        assert!(rendered.contains("Env = \"stage\""));
        assert!(rendered.contains("Priority = \"P0\""));

        // Full reordered dataset is present for iteration-based runs.
        let stage = rendered.find("\"Env\": \"stage\"").unwrap();
        let prod = rendered.find("\"Env\": \"prod\"").unwrap();
        assert!(stage < prod);
    }

    #[test]
    fn short_rows_are_padded_with_empty_values() {
        let input = dataset(&["A", "B"], &[&["only-a"]]);
        let rendered = render_variable_file(&input);
        assert!(rendered.contains("A = \"only-a\""));
        assert!(rendered.contains("B = \"\""));
        assert!(rendered.contains("\"B\": \"\""));
    }

    #[test]
    fn values_are_escaped_as_python_strings() {
        let input = dataset(&["Msg"], &[&["say \"hi\"\\now"]]);
        let rendered = render_variable_file(&input);
        assert!(rendered.contains(r#"Msg = "say \"hi\"\\now""#));
    }

    #[test]
    fn write_produces_the_rendered_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("variables.py");
        let input = dataset(&["Env"], &[&["prod"]]);

        write_variable_file(&path, &input).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_variable_file(&input));
    }

    #[test]
    fn empty_dataset_renders_empty_flat_variables() {
        let input = dataset(&["Env"], &[]);
        let rendered = render_variable_file(&input);
        assert!(rendered.contains("Env = \"\""));
        assert!(rendered.contains("DATASET = [\n]"));
    }
}
