//! CLI output formatting for the `compress` and `check` commands.
//!
//! # Output Format
//!
//! Every input leads with its 1-based position and name, followed by
//! indented context lines.
//!
//! ## Compress
//!
//! ```text
//! 001 lake.jpg
//!     Source: photos/lake.jpg (4000x3000, 3.1 MB)
//!     Output: out/lake.jpg (1920x1440, 402.3 KB)
//! 002 broken.png
//!     Source: photos/broken.png
//!     Failed (decode): Failed to decode broken.png: ...
//!
//! Compressed 1 of 2 photos, 3.1 MB → 402.3 KB (1 failed)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 lake.jpg
//!     4000x3000 → 1920x1440
//! 002 small.jpg
//!     800x600 (unchanged)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. With `--json` the report
//! structs are serialized as-is instead.

use crate::batch::{CompressOutcome, CompressReport, InspectOutcome, InspectReport};
use serde::Serialize;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count in binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

// ============================================================================
// compress
// ============================================================================

/// Format one compress report as display lines.
pub fn format_compress_report(index: usize, report: &CompressReport) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), report.name)];
    match &report.outcome {
        CompressOutcome::Compressed {
            output,
            source,
            target,
            output_bytes,
        } => {
            lines.push(format!(
                "    Source: {} ({}, {})",
                report.input.display(),
                source,
                format_bytes(report.input_bytes)
            ));
            lines.push(format!(
                "    Output: {} ({}, {})",
                output.display(),
                target,
                format_bytes(*output_bytes)
            ));
        }
        CompressOutcome::Failed { stage, message } => {
            lines.push(format!("    Source: {}", report.input.display()));
            lines.push(format!("    Failed ({}): {}", stage, message));
        }
    }
    lines
}

/// One-line totals for a batch.
pub fn format_summary(reports: &[CompressReport]) -> String {
    let mut compressed = 0;
    let mut input_total = 0;
    let mut output_total = 0;
    for report in reports {
        if let CompressOutcome::Compressed { output_bytes, .. } = &report.outcome {
            compressed += 1;
            input_total += report.input_bytes;
            output_total += output_bytes;
        }
    }
    let failed = reports.len() - compressed;

    let mut summary = format!(
        "Compressed {} of {} photos, {} \u{2192} {}",
        compressed,
        reports.len(),
        format_bytes(input_total),
        format_bytes(output_total)
    );
    if failed > 0 {
        summary.push_str(&format!(" ({} failed)", failed));
    }
    summary
}

pub fn format_compress_output(reports: &[CompressReport]) -> Vec<String> {
    let mut lines: Vec<String> = reports
        .iter()
        .enumerate()
        .flat_map(|(i, report)| format_compress_report(i + 1, report))
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format_summary(reports));
    lines
}

/// Print compress output to stdout.
pub fn print_compress_output(reports: &[CompressReport]) {
    for line in format_compress_output(reports) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check_output(reports: &[InspectReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, report) in reports.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), report.name));
        match &report.outcome {
            InspectOutcome::Planned { source, target } if source == target => {
                lines.push(format!("    {} (unchanged)", source));
            }
            InspectOutcome::Planned { source, target } => {
                lines.push(format!("    {} \u{2192} {}", source, target));
            }
            InspectOutcome::Failed { stage, message } => {
                lines.push(format!("    Failed ({}): {}", stage, message));
            }
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(reports: &[InspectReport]) {
    for line in format_check_output(reports) {
        println!("{}", line);
    }
}

/// Print any report list as pretty JSON to stdout.
pub fn print_json<T: Serialize>(reports: &[T]) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use std::path::PathBuf;

    fn compressed(name: &str, input_bytes: u64, output_bytes: u64) -> CompressReport {
        CompressReport {
            input: PathBuf::from(format!("photos/{name}")),
            name: name.to_string(),
            input_bytes,
            outcome: CompressOutcome::Compressed {
                output: PathBuf::from(format!("out/{name}")),
                source: Dimensions::new(4000, 3000),
                target: Dimensions::new(1920, 1440),
                output_bytes,
            },
        }
    }

    fn failed(name: &str) -> CompressReport {
        CompressReport {
            input: PathBuf::from(format!("photos/{name}")),
            name: name.to_string(),
            input_bytes: 10,
            outcome: CompressOutcome::Failed {
                stage: "decode",
                message: format!("Failed to decode {name}: bad data"),
            },
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn format_compress_report_success() {
        let lines = format_compress_report(1, &compressed("lake.jpg", 2048, 1024));
        assert_eq!(
            lines,
            vec![
                "001 lake.jpg",
                "    Source: photos/lake.jpg (4000x3000, 2.0 KB)",
                "    Output: out/lake.jpg (1920x1440, 1.0 KB)",
            ]
        );
    }

    #[test]
    fn format_compress_report_failure() {
        let lines = format_compress_report(2, &failed("broken.png"));
        assert_eq!(lines[0], "002 broken.png");
        assert_eq!(lines[1], "    Source: photos/broken.png");
        assert_eq!(
            lines[2],
            "    Failed (decode): Failed to decode broken.png: bad data"
        );
    }

    #[test]
    fn summary_counts_only_successes() {
        let reports = vec![compressed("a.jpg", 2048, 512), failed("b.jpg")];
        assert_eq!(
            format_summary(&reports),
            "Compressed 1 of 2 photos, 2.0 KB \u{2192} 512 B (1 failed)"
        );
    }

    #[test]
    fn summary_without_failures() {
        let reports = vec![compressed("a.jpg", 100, 50)];
        assert_eq!(
            format_summary(&reports),
            "Compressed 1 of 1 photos, 100 B \u{2192} 50 B"
        );
    }

    #[test]
    fn compress_output_ends_with_summary() {
        let lines = format_compress_output(&[compressed("a.jpg", 100, 50)]);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "");
        assert!(lines[4].starts_with("Compressed 1 of 1"));
    }

    #[test]
    fn compress_output_empty_batch() {
        let lines = format_compress_output(&[]);
        assert_eq!(lines, vec!["Compressed 0 of 0 photos, 0 B \u{2192} 0 B"]);
    }

    #[test]
    fn check_output_shows_plan() {
        let reports = vec![
            InspectReport {
                input: PathBuf::from("lake.jpg"),
                name: "lake.jpg".into(),
                outcome: InspectOutcome::Planned {
                    source: Dimensions::new(4000, 3000),
                    target: Dimensions::new(1920, 1440),
                },
            },
            InspectReport {
                input: PathBuf::from("small.jpg"),
                name: "small.jpg".into(),
                outcome: InspectOutcome::Planned {
                    source: Dimensions::new(800, 600),
                    target: Dimensions::new(800, 600),
                },
            },
            InspectReport {
                input: PathBuf::from("gone.jpg"),
                name: "gone.jpg".into(),
                outcome: InspectOutcome::Failed {
                    stage: "read",
                    message: "Failed to read gone.jpg".into(),
                },
            },
        ];
        let lines = format_check_output(&reports);
        assert_eq!(
            lines,
            vec![
                "001 lake.jpg",
                "    4000x3000 \u{2192} 1920x1440",
                "002 small.jpg",
                "    800x600 (unchanged)",
                "003 gone.jpg",
                "    Failed (read): Failed to read gone.jpg",
            ]
        );
    }
}
