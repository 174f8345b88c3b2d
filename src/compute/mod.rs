//! Compute API command framework
//!
//! Resource commands share one pipeline: the locator builds canonical URLs,
//! the resolver picks the scope of a request, the lister fans out across
//! scopes, the batch executor runs independent requests concurrently and
//! the poller waits for operations to finish.

pub mod batch;
pub mod client;
pub mod collection;
pub mod commands;
pub mod filters;
pub mod lister;
pub mod locator;
pub mod models;
pub mod poller;
pub mod resolver;
pub mod scope;
pub mod traits;
pub mod version;

pub use batch::{BatchExecutor, PendingRequest};
pub use client::{ComputeClient, RestCollection};
pub use collection::{collection_names, find_collection, Collection, ALL_COLLECTIONS};
pub use commands::{
    run_delete_command, run_get_command, run_insert_command, run_list_command, run_wait_command,
};
pub use filters::{errors_in_results, newest_images, operation_errors};
pub use lister::{AggregatedLister, ListRequest, ResultFilter};
pub use locator::{denormalize, denormalize_project, ResourceLocator};
pub use models::{AggregatedResult, BatchOutcome, ListWarning, ScopeWarning, ScopedList};
pub use poller::{OperationPoller, PollSpec};
pub use resolver::ScopeResolver;
pub use scope::{Scope, ScopeFlags, ScopeKind, ScopeKinds};
pub use traits::{
    ChoicePrompt, CollectionApi, ComputeResource, PageRequest, Paginated, ScopeCatalog,
    StatusSource,
};
pub use version::ApiVersion;
