//! Must-use plugins injected into the environment for a scenario.
//!
//! The PHP source is base64-encoded and written by `wp eval`, so no file
//! needs to be shared with the container.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::StepError;
use crate::php;

/// Returns `true` if `name` is usable as a must-use plugin file name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Checks `name`, returning it without a trailing `.php`.
///
/// # Errors
///
/// Returns [`StepError::Maintenance`] if the name contains anything but
/// ASCII letters, digits, `-` and `_`.
pub fn normalize_name(name: &str) -> Result<&str, StepError> {
    let bare = name.strip_suffix(".php").unwrap_or(name);
    if is_valid_name(bare) {
        Ok(bare)
    } else {
        Err(StepError::Maintenance {
            operation: "must-use plugin injection",
            detail: format!("invalid plugin file name {name:?}"),
        })
    }
}

fn file_expr(name: &str) -> String {
    format!("WPMU_PLUGIN_DIR . {}", php::string_literal(&format!("/{name}.php")))
}

/// Command that writes `source` to `WPMU_PLUGIN_DIR/<name>.php`.
#[must_use]
pub fn inject_command(name: &str, source: &str) -> String {
    let encoded = STANDARD.encode(source);
    php::eval_command(&format!(
        "wp_mkdir_p(WPMU_PLUGIN_DIR); \
         if (false === file_put_contents({file}, base64_decode(\"{encoded}\"))) {{ \
         WP_CLI::error(\"could not write {name}.php\"); }}",
        file = file_expr(name),
    ))
}

/// Command that deletes `WPMU_PLUGIN_DIR/<name>.php` if present.
#[must_use]
pub fn remove_command(name: &str) -> String {
    php::eval_command(&format!(
        "$file = {file}; \
         if (file_exists($file) && !unlink($file)) {{ WP_CLI::error(\"could not remove {name}.php\"); }}",
        file = file_expr(name),
    ))
}
