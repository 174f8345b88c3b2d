//! CLI argument parsing

mod common;
mod context;
mod resource;

use clap::{Parser, Subcommand};

use crate::config::{api, context as context_config, defaults};

pub use common::{OutputFormat, ScopeArgs};
pub use context::{ConfigAction, DeleteContextArgs, SetContextArgs, UseContextArgs};
pub use resource::{DeleteArgs, GetArgs, InsertArgs, ListArgs, WaitArgs};

/// Compute infrastructure CLI
#[derive(Parser, Debug)]
#[command(name = "computectl")]
#[command(version)]
#[command(
    about = "List, inspect, create and delete compute resources",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project to operate on (overrides the active context)
    #[arg(short, long, env = defaults::PROJECT_ENV_VAR)]
    pub project: Option<String>,

    /// Named context to use instead of the current one
    #[arg(long, global = true, env = context_config::ENV_VAR)]
    pub context: Option<String>,

    /// API host, without version
    #[arg(long)]
    pub api_host: Option<String>,

    /// API version, e.g. v1beta15
    #[arg(long)]
    pub service_version: Option<String>,

    /// API token (overrides the token stored in the context)
    #[arg(
        short = 't',
        long,
        env = defaults::TOKEN_ENV_VAR,
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Never prompt; fail where a choice would be needed
    #[arg(long, global = true, default_value_t = false)]
    pub batch: bool,

    /// Wait for operations to finish before returning
    #[arg(long, global = true, default_value_t = false)]
    pub synchronous: bool,

    /// Seconds between two polls of an operation (at least 1)
    #[arg(
        long,
        global = true,
        default_value_t = defaults::SLEEP_BETWEEN_POLLS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sleep_between_polls: u64,

    /// Maximum seconds to wait for one operation
    #[arg(long, global = true, default_value_t = defaults::MAX_WAIT_TIME)]
    pub max_wait_time: u64,

    /// Maximum number of requests in flight
    #[arg(long, global = true, default_value_t = api::MAX_CONCURRENT_REQUESTS)]
    pub max_concurrency: usize,

    /// Timeout in seconds for each HTTP request
    #[arg(long, global = true, default_value_t = defaults::REQUEST_TIMEOUT)]
    pub request_timeout: u64,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List resources of a collection across scopes
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Get one resource
    Get(GetArgs),

    /// Delete resources
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Create resources from a JSON body
    Insert(InsertArgs),

    /// Wait for operations or resources to reach a final state
    Wait(WaitArgs),

    /// Manage named contexts
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}
