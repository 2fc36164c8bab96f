//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Originals (2)
//!     beach.jpg
//!     portrait.png
//! ```
//!
//! ## Edit
//!
//! ```text
//! beach.jpg → beach_edited_1717171717171.png (640x480)
//! ```
//!
//! ## Analyze
//!
//! ```text
//! beach.jpg
//!     brightness  128.00  balanced
//!     contrast     12.40  lacks contrast, consider increasing
//!     vibrancy     20.10  lacks vibrancy, consider increasing saturation
//! ```
//!
//! A batch run prints one block per image, with failures inline:
//!
//! ```text
//! broken.jpg
//!     error: failed to decode broken.jpg: ...
//!
//! Analyzed 3 images, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::analysis::AnalysisResult;
use crate::error::Result;
use crate::pipeline::DerivedArtifact;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// Format a pool listing under a titled header.
pub fn format_listing<'a>(title: &str, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let names: Vec<&String> = names.into_iter().collect();
    let mut lines = vec![format!("{} ({})", title, names.len())];
    lines.extend(names.iter().map(|n| format!("{}{}", indent(1), n)));
    lines
}

pub fn print_listing<'a>(title: &str, names: impl IntoIterator<Item = &'a String>) {
    print_lines(format_listing(title, names));
}

// ============================================================================
// Edit
// ============================================================================

pub fn format_artifact(artifact: &DerivedArtifact) -> Vec<String> {
    vec![format!(
        "{} → {} ({}x{})",
        artifact.source, artifact.name, artifact.width, artifact.height
    )]
}

pub fn print_artifact(artifact: &DerivedArtifact) {
    print_lines(format_artifact(artifact));
}

// ============================================================================
// Analyze
// ============================================================================

/// Format one analysis result as a header plus one line per metric.
pub fn format_analysis(result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![result.source.clone()];
    for reading in &result.readings {
        lines.push(format!(
            "{}{:<10} {:>7.2}  {}",
            indent(1),
            reading.metric.to_string(),
            reading.value,
            reading.recommendation
        ));
    }
    lines
}

pub fn print_analysis(result: &AnalysisResult) {
    print_lines(format_analysis(result));
}

/// Format a batch run: one block per image, then a summary line.
pub fn format_batch(results: &[(String, Result<AnalysisResult>)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (name, outcome) in results {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        match outcome {
            Ok(result) => lines.extend(format_analysis(result)),
            Err(e) => {
                failed += 1;
                lines.push(name.clone());
                lines.push(format!("{}error: {}", indent(1), e));
            }
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    let summary = format!("Analyzed {}", plural(results.len(), "image"));
    lines.push(if failed > 0 {
        format!("{summary}, {failed} failed")
    } else {
        summary
    });
    lines
}

pub fn print_batch(results: &[(String, Result<AnalysisResult>)]) {
    print_lines(format_batch(results));
}

// ============================================================================
// Tests
// ============================================================================
