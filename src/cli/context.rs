//! Config management CLI arguments (kubectl-style)

use clap::{Parser, Subcommand};

/// Config subcommands for managing named contexts
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Set a context entry in the config file
    #[command(name = "set-context")]
    SetContext(SetContextArgs),

    /// Set the current-context in the config file
    #[command(name = "use-context")]
    UseContext(UseContextArgs),

    /// Describe all contexts
    #[command(name = "get-contexts")]
    GetContexts,

    /// Display the current-context
    #[command(name = "current-context")]
    CurrentContext,

    /// Delete the specified context from the config file
    #[command(name = "delete-context")]
    DeleteContext(DeleteContextArgs),

    /// Display config file contents with tokens masked
    View,
}

/// Arguments for 'config set-context' subcommand
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        computectl config set-context prod --project my-project --zone us-east-a\n  \
        computectl config set-context legacy --project old --service-version v1beta12\n  \
        computectl config set-context prod --region us-west   # update existing context")]
pub struct SetContextArgs {
    /// Context name
    pub name: String,
    /// Project requests are issued against
    #[arg(long)]
    pub project: Option<String>,
    /// Default zone
    #[arg(long)]
    pub zone: Option<String>,
    /// Default region
    #[arg(long)]
    pub region: Option<String>,
    /// API host, without version
    #[arg(long)]
    pub api_host: Option<String>,
    /// API version, e.g. v1beta15
    #[arg(long)]
    pub service_version: Option<String>,
    /// API token (stored in config file)
    #[arg(long)]
    pub token: Option<String>,
}

/// Arguments for 'config use-context' subcommand
#[derive(Parser, Debug)]
pub struct UseContextArgs {
    /// Context name to activate
    pub name: String,
}

/// Arguments for 'config delete-context' subcommand
#[derive(Parser, Debug)]
pub struct DeleteContextArgs {
    /// Context name to delete
    pub name: String,
}
