//! UI utilities for terminal output
//!
//! Progress spinners, the scope selection menu and the delete confirmation.

mod confirm;
mod prompt;
mod spinner;

pub use confirm::confirm_delete;
pub use prompt::DialoguerPrompt;
pub use spinner::{clear_spinner, create_spinner, finish_spinner, finish_spinner_with_status};
