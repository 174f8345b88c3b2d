//! Progress spinner utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::compute::BatchOutcome;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Create a spinner on stderr with the given message
///
/// Returns `None` in quiet (batch) mode.
pub fn create_spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(TICKS)
        .template("{spinner:.blue} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Finish spinner with a message
pub fn finish_spinner(spinner: Option<ProgressBar>, message: &str) {
    if let Some(s) = spinner {
        s.finish_with_message(message.to_string());
    }
}

/// Clear the spinner line, e.g. before an interactive prompt or output
pub fn clear_spinner(spinner: Option<ProgressBar>) {
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
}

/// Finish spinner according to how a batch went
pub fn finish_spinner_with_status<T>(spinner: Option<ProgressBar>, outcome: &BatchOutcome<T>) {
    let Some(s) = spinner else {
        return;
    };
    if outcome.has_errors() && outcome.results.is_empty() {
        s.finish_and_clear();
    } else if outcome.has_errors() {
        s.finish_with_message(format!(
            "Completed with errors ({} succeeded, {} failed)",
            outcome.results.len(),
            outcome.exceptions.len()
        ));
    } else {
        s.finish_with_message("Done");
    }
}
