//! Port traits defining external boundaries.
//!
//! The only boundary this harness crosses is process execution: every
//! interaction with the WordPress environment is a shell command.
//! Implementations live in `src/adapters/`.

pub mod shell;

pub use shell::{ShellExecutor, ShellOutput};
