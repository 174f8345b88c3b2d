//! Resource command arguments

use clap::Parser;

use super::common::ScopeArgs;
use crate::compute::{collection_names, find_collection, Collection};

/// Parse a collection name or alias
fn parse_collection(name: &str) -> Result<&'static Collection, String> {
    find_collection(name).ok_or_else(|| {
        format!(
            "unknown collection '{}'. Known collections: {}",
            name,
            collection_names().join(", ")
        )
    })
}

/// Arguments for 'list' subcommand
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        computectl list instances\n  \
        computectl list disks --zone us-east-a\n  \
        computectl list instances --sort-by -creationTimestamp\n  \
        computectl list images --old-images --no-standard-images\n  \
        computectl list operations --global --filter 'status ne DONE'")]
pub struct ListArgs {
    /// Collection to list (e.g. instances, disks, images, operations)
    #[arg(value_parser = parse_collection)]
    pub collection: &'static Collection,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Server-side filter expression, e.g. "name eq my-disk"
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Page size requested from the API
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Sort by a field; prefix with '-' for descending order (e.g. -creationTimestamp)
    #[arg(long, allow_hyphen_values = true)]
    pub sort_by: Option<String>,

    /// Show every image version instead of the newest per family
    #[arg(long, default_value_t = false)]
    pub old_images: bool,

    /// List only the project's own images
    #[arg(long, default_value_t = false)]
    pub no_standard_images: bool,
}

/// Arguments for 'get' subcommand
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Collection of the resource
    #[arg(value_parser = parse_collection)]
    pub collection: &'static Collection,

    /// Resource name or URL
    pub name: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Arguments for 'delete' subcommand
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        computectl delete disks d1 d2 --zone us-east-a\n  \
        computectl --synchronous delete instances web-1 -y")]
pub struct DeleteArgs {
    /// Collection of the resources
    #[arg(value_parser = parse_collection)]
    pub collection: &'static Collection,

    /// Resource names or URLs
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Skip confirmation prompt
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,
}

/// Arguments for 'insert' subcommand
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
        computectl insert disks d1 d2 --zone us-east-a --body '{\"sizeGb\": \"10\"}'\n  \
        computectl insert firewalls allow-ssh --body @firewall.json")]
pub struct InsertArgs {
    /// Collection to insert into
    #[arg(value_parser = parse_collection)]
    pub collection: &'static Collection,

    /// Names of the new resources
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Resource body as JSON, or @file to read it from a file
    #[arg(long, default_value = "{}")]
    pub body: String,
}

/// Arguments for 'wait' subcommand
#[derive(Parser, Debug)]
pub struct WaitArgs {
    /// Collection of the resources (operations, disks, instances, snapshots)
    #[arg(value_parser = parse_collection)]
    pub collection: &'static Collection,

    /// Resource names or URLs
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}
