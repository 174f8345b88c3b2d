//! Interactive scope selection

use dialoguer::{theme::ColorfulTheme, Select};

use crate::compute::ChoicePrompt;
use crate::error::{ComputeError, Result};

/// Terminal menu backed by `dialoguer::Select`
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl ChoicePrompt for DialoguerPrompt {
    fn choose(&self, label: &str, choices: &[String]) -> Result<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Select a {}", label))
            .items(choices)
            .default(0)
            .interact()
            .map_err(|e| ComputeError::Prompt(e.to_string()))
    }
}
