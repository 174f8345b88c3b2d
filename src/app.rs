//! Command dispatch
//!
//! Settings come from CLI flags first, then the active context, then the
//! built-in defaults.

use std::time::Duration;

use log::debug;

use crate::cli::{Cli, Command};
use crate::compute::{
    denormalize_project, run_delete_command, run_get_command, run_insert_command,
    run_list_command, run_wait_command, ComputeClient,
};
use crate::config::{defaults, Settings};
use crate::context::{resolve_active_context, run_context_command, Context, ContextStore};
use crate::error::{ComputeError, Result};

/// Build the per-invocation settings
pub fn build_settings(cli: &Cli, context: Option<&Context>) -> Result<Settings> {
    let project = cli
        .project
        .clone()
        .or_else(|| context.map(|c| c.project.clone()))
        .ok_or_else(|| {
            ComputeError::Usage(format!(
                "No project given. Use --project, {} or 'computectl config set-context'",
                defaults::PROJECT_ENV_VAR
            ))
        })?;

    let mut settings = Settings::new(&denormalize_project(&project)?);

    if let Some(host) = cli
        .api_host
        .clone()
        .or_else(|| context.and_then(|c| c.api_host.clone()))
    {
        settings.api_host = host;
    }
    if let Some(version) = cli
        .service_version
        .as_deref()
        .or_else(|| context.and_then(|c| c.service_version.as_deref()))
    {
        settings.version = version.parse()?;
    }

    settings.synchronous = cli.synchronous;
    settings.batch = cli.batch;
    settings.poll_interval = Duration::from_secs(cli.sleep_between_polls);
    settings.max_wait = Duration::from_secs(cli.max_wait_time);
    settings.request_timeout = Duration::from_secs(cli.request_timeout);
    settings.max_concurrency = cli.max_concurrency.max(1);
    settings.default_zone = context.and_then(|c| c.zone.clone());
    settings.default_region = context.and_then(|c| c.region.clone());

    debug!(
        "Settings: project={}, base={}, synchronous={}, batch={}",
        settings.project,
        settings.versioned_base(),
        settings.synchronous,
        settings.batch
    );
    Ok(settings)
}

/// API token from --token / COMPUTE_TOKEN, then the active context
pub fn resolve_token(cli: &Cli, context: Option<&Context>) -> Result<String> {
    cli.token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| context.and_then(|c| c.token.clone()))
        .ok_or_else(|| {
            ComputeError::Usage(format!(
                "No API token found. Use --token, {} or 'computectl config set-context --token'",
                defaults::TOKEN_ENV_VAR
            ))
        })
}

/// Run the parsed command; `Ok(false)` means some requests failed
pub async fn run(cli: &Cli) -> Result<bool> {
    if let Command::Config { action } = &cli.command {
        run_context_command(action)?;
        return Ok(true);
    }

    let store = ContextStore::new();
    let context = resolve_active_context(&store, cli.context.as_deref())?;
    let settings = build_settings(cli, context.as_ref())?;
    let token = resolve_token(cli, context.as_ref())?;
    let client = ComputeClient::new(token, &settings);
    let format = cli.output;

    match &cli.command {
        Command::List(args) => run_list_command(&client, &settings, args, format).await,
        Command::Get(args) => run_get_command(&client, &settings, args, format).await,
        Command::Delete(args) => run_delete_command(&client, &settings, args, format).await,
        Command::Insert(args) => run_insert_command(&client, &settings, args, format).await,
        Command::Wait(args) => run_wait_command(&client, &settings, args, format).await,
        Command::Config { .. } => Ok(true),
    }
}
