//! computectl - Manage compute infrastructure resources
//!
//! A CLI for resource-oriented compute APIs: instances, disks, images,
//! networks, operations and the other collections of a project.
//!
//! # Features
//!
//! - Canonical resource URLs from short names, paths or full links
//! - Scope resolution from flags, contexts, the resource itself or a prompt
//! - Listing across every zone and region, with aggregated calls when offered
//! - Concurrent batches of inserts and deletes
//! - Waiting for operations and resources to settle
//!
//! # Example
//!
//! ```bash
//! # List instances in every zone
//! computectl --project my-project list instances
//!
//! # Delete two disks and wait for the operations
//! computectl --project my-project --synchronous delete disks d1 d2 -y
//!
//! # Newest images of every family, as YAML
//! computectl --project my-project list images -o yaml
//! ```

pub mod app;
pub mod cli;
pub mod compute;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod ui;

pub use app::{build_settings, resolve_token, run};
pub use cli::{Cli, Command, OutputFormat};
pub use compute::{
    AggregatedLister, AggregatedResult, ApiVersion, BatchExecutor, BatchOutcome, Collection,
    ComputeClient, OperationPoller, ResourceLocator, Scope, ScopeFlags, ScopeResolver,
};
pub use config::Settings;
pub use error::{ComputeError, Result};
