//! Context resolution from multiple sources

use log::debug;

use crate::config::context as context_config;
use crate::error::{ComputeError, Result};

use super::models::Context;
use super::store::ContextStore;

/// Name of the active context, from the first source that has one:
/// 1. --context CLI flag
/// 2. COMPUTECTL_CONTEXT env var
/// 3. current-context from the config file
pub fn resolve_active_context_name(
    store: &ContextStore,
    cli_context: Option<&str>,
) -> Result<Option<String>> {
    if let Some(name) = cli_context.filter(|n| !n.is_empty()) {
        debug!("Using context from CLI flag: {}", name);
        return Ok(Some(name.to_string()));
    }

    if let Ok(name) = std::env::var(context_config::ENV_VAR) {
        if !name.is_empty() {
            debug!(
                "Using context from {} env var: {}",
                context_config::ENV_VAR,
                name
            );
            return Ok(Some(name));
        }
    }

    let config = store.load()?;
    if let Some(name) = &config.current_context {
        debug!("Using context from config file: {}", name);
    }
    Ok(config.current_context)
}

/// The active context, if any
///
/// Naming a context that does not exist is an error.
pub fn resolve_active_context(
    store: &ContextStore,
    cli_context: Option<&str>,
) -> Result<Option<Context>> {
    let Some(name) = resolve_active_context_name(store, cli_context)? else {
        debug!("No active context");
        return Ok(None);
    };

    let config = store.load()?;
    match config.contexts.get(&name) {
        Some(ctx) => {
            debug!("Resolved context '{}': project={}", name, ctx.project);
            Ok(Some(ctx.clone()))
        }
        None => Err(ComputeError::Config(format!(
            "Context '{}' not found in {}",
            name,
            store.path().display()
        ))),
    }
}
