//! Colored stderr output helpers following modern CLI conventions.

use owo_colors::OwoColorize;
use std::env;

/// Check if colored output should be disabled
fn colors_disabled() -> bool {
    env::var("NO_COLOR").is_ok()
        || env::var("TERM").is_ok_and(|t| t == "dumb")
        || !atty::is(atty::Stream::Stderr)
}

/// Print a note message with default formatting
pub fn note(msg: &str) {
    eprintln!("{msg}");
}

/// Print a warning message with "Warning:" prefix in yellow
pub fn warning(msg: &str) {
    if colors_disabled() {
        eprintln!("Warning: {msg}");
    } else {
        eprintln!("{} {}", "Warning:".yellow().bold(), msg.yellow());
    }
}

/// Print an error message with "Error:" prefix in red
pub fn error(msg: &str) {
    if colors_disabled() {
        eprintln!("Error: {msg}");
    } else {
        eprintln!("{} {}", "Error:".red().bold(), msg.red());
    }
}

/// Format a model name with colors
pub fn format_model(model: &str) -> String {
    if colors_disabled() {
        model.to_string()
    } else {
        model.cyan().to_string()
    }
}
