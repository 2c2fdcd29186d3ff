//! Work item state and action color mapping for CLI output.
//!
//! `console` disables styling when the stream is not a terminal or
//! `NO_COLOR` is set.

use console::{style, StyledObject};

/// Returns a colored string for a work item state.
///
/// Color scheme:
/// - Blue:   new
/// - Yellow: active
/// - Green:  resolved, closed
/// - Dim:    removed, unknown
pub fn colorize_state(state: &str) -> StyledObject<&str> {
    match state.to_lowercase().as_str() {
        "new" => style(state).blue(),
        "active" | "approved" | "committed" => style(state).yellow(),
        "resolved" | "closed" | "done" => style(state).green().bold(),
        _ => style(state).dim(),
    }
}

/// Returns a colored string for a reconcile action name.
pub fn colorize_action(action: &str) -> StyledObject<&str> {
    match action {
        "created" => style(action).green().bold(),
        "updated" => style(action).cyan(),
        "failed" => style(action).red().bold(),
        _ => style(action).dim(),
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}
