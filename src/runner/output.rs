//! Classification of raw environment output.
//!
//! wp-env prefixes its own progress lines with a status glyph. Those are
//! dropped before the command's output is split into plain output and the
//! `Error:`/`Warning:` blocks printed by WP-CLI.

/// Prefixes of wp-env's info, success and failure status lines.
pub const STATUS_GLYPHS: [&str; 3] = ["ℹ ", "✔ ", "✖ "];

/// Prefixes that open a structured error block.
pub const ERROR_MARKERS: [&str; 2] = ["Error:", "Warning:"];

/// Output split into its two streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedOutput {
    /// Lines outside any error block, joined with `\n`.
    pub stdout: String,
    /// Lines inside error blocks, joined with `\n`.
    pub stderr: String,
}

/// Splits raw output into lines, dropping each line's trailing whitespace.
#[must_use]
pub fn output_lines(raw: &str) -> Vec<&str> {
    raw.lines().map(str::trim_end).collect()
}

/// Drops status-glyph lines, and blank lines when there is more than one line.
///
/// A sole blank line is kept so that an intentionally empty single-line
/// output is not collapsed.
#[must_use]
pub fn filter_noise<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let multi_line = lines.len() > 1;
    lines
        .iter()
        .copied()
        .filter(|line| !STATUS_GLYPHS.iter().any(|glyph| line.starts_with(glyph)))
        .filter(|line| !(multi_line && line.trim().is_empty()))
        .collect()
}

/// Moves `Error:`/`Warning:` blocks out of the output.
///
/// A marker line opens a block, lines starting with a space or tab
/// continue it, and any other line closes it.
#[must_use]
pub fn extract_errors(lines: &[&str]) -> ClassifiedOutput {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut in_block = false;

    for &line in lines {
        if ERROR_MARKERS.iter().any(|marker| line.starts_with(marker)) {
            in_block = true;
            stderr.push(line);
        } else if in_block && (line.starts_with(' ') || line.starts_with('\t')) {
            stderr.push(line);
        } else {
            in_block = false;
            stdout.push(line);
        }
    }

    ClassifiedOutput { stdout: stdout.join("\n"), stderr: stderr.join("\n") }
}

/// Full classification pipeline for one command's raw output.
///
/// Error blocks are only separated when `extract` is set; otherwise all
/// filtered lines are standard output.
#[must_use]
pub fn classify(raw: &str, extract: bool) -> ClassifiedOutput {
    let lines = output_lines(raw);
    let filtered = filter_noise(&lines);
    if extract {
        extract_errors(&filtered)
    } else {
        ClassifiedOutput { stdout: filtered.join("\n"), stderr: String::new() }
    }
}
