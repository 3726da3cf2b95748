//! Delimited regular expressions such as `/^Success: .*$/i`.

use regex::{Regex, RegexBuilder};

use crate::error::StepError;

fn invalid(pattern: &str, reason: impl Into<String>) -> StepError {
    StepError::InvalidPattern { pattern: pattern.to_string(), reason: reason.into() }
}

/// Compiles a pattern written between delimiters with trailing flags.
///
/// Any non-alphanumeric, non-backslash, non-whitespace character may
/// delimit; `(`, `[`, `{` and `<` close with their counterpart. Supported
/// flags: `i` (case-insensitive), `m` (multi-line), `s` (dot matches
/// newline), `x` (extended), `U` (ungreedy), `u` (unicode, always on).
///
/// # Errors
///
/// Returns [`StepError::InvalidPattern`] for a missing delimiter, an
/// unknown flag, or a body that does not compile.
pub fn compile(pattern: &str) -> Result<Regex, StepError> {
    let Some(open) = pattern.chars().next() else {
        return Err(invalid(pattern, "empty pattern"));
    };
    if open.is_alphanumeric() || open == '\\' || open.is_whitespace() {
        return Err(invalid(pattern, "delimiter must not be alphanumeric, backslash or whitespace"));
    }
    let close = match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    };

    let inner = &pattern[open.len_utf8()..];
    let Some(end) = inner.rfind(close) else {
        return Err(invalid(pattern, format!("no ending delimiter '{close}' found")));
    };
    let body = &inner[..end];
    let flags = &inner[end + close.len_utf8()..];

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            'u' => builder.unicode(true),
            other => return Err(invalid(pattern, format!("unknown modifier '{other}'"))),
        };
    }
    builder.build().map_err(|e| invalid(pattern, e.to_string()))
}
