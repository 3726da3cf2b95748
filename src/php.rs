//! Building `wp eval` commands.

use crate::runner::escape_single_quoted;

/// Renders `value` as a PHP double-quoted string literal.
#[must_use]
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A WP-CLI command that evaluates `code` inside WordPress.
///
/// The code is single-quoted for the shell that runs the tool.
#[must_use]
pub fn eval_command(code: &str) -> String {
    format!("eval '{}'", escape_single_quoted(code))
}
