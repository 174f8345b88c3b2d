//! Command handlers for the resource verbs
//!
//! Each handler returns `Ok(true)` when every request succeeded and
//! `Ok(false)` when some of them failed but were reported.

use std::sync::Arc;

use futures::FutureExt;
use log::{debug, info};
use serde_json::Value;

use super::batch::{BatchExecutor, PendingRequest};
use super::client::ComputeClient;
use super::collection::{Collection, IMAGES, OPERATIONS};
use super::filters::{errors_in_results, newest_images};
use super::lister::{AggregatedLister, ListRequest, ResultFilter};
use super::locator::{denormalize, extract_project};
use super::models::{BatchOutcome, REQUEST_FAILED};
use super::poller::{OperationPoller, PollSpec};
use super::resolver::ScopeResolver;
use super::scope::{Scope, ScopeFlags};
use super::traits::{ChoicePrompt, CollectionApi};
use crate::cli::{DeleteArgs, GetArgs, InsertArgs, ListArgs, OutputFormat, WaitArgs};
use crate::config::{images, Settings};
use crate::error::{ComputeError, Result};
use crate::output::{output_batch, output_list, output_raw};
use crate::ui::{
    clear_spinner, confirm_delete, create_spinner, finish_spinner_with_status, DialoguerPrompt,
};

/// Whether a batch went through without request or operation errors
fn batch_succeeded(outcome: &BatchOutcome<Value>) -> bool {
    !outcome.has_errors() && !errors_in_results(&outcome.results)
}

fn prompt_for(settings: &Settings) -> Option<&'static dyn ChoicePrompt> {
    if settings.batch {
        None
    } else {
        Some(&DialoguerPrompt)
    }
}

/// A resolved resource: where it lives and its short name
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    project: String,
    scope: Scope,
    name: String,
}

impl Target {
    /// `reference` in `scope`, in the project the reference names or the
    /// configured one
    fn new(settings: &Settings, scope: Scope, reference: &str) -> Self {
        Self {
            project: extract_project(reference).unwrap_or_else(|| settings.project.clone()),
            scope,
            name: denormalize(reference),
        }
    }
}

/// Resolve the scope of each named resource
///
/// Resolution runs one name at a time since it may prompt. A name whose
/// scope cannot be resolved is reported as a failure of the batch.
async fn resolve_targets(
    resolver: &ScopeResolver<'_>,
    settings: &Settings,
    collection: &Collection,
    api: &dyn CollectionApi,
    flags: &ScopeFlags,
    names: &[String],
) -> (Vec<Target>, Vec<ComputeError>) {
    let mut targets = Vec::with_capacity(names.len());
    let mut failures = Vec::new();
    for reference in names {
        match resolver
            .resolve_for_resource(collection, api, flags, reference)
            .await
        {
            Ok(scope) => {
                let target = Target::new(settings, scope, reference);
                debug!(
                    "{} '{}' is in project '{}', {}",
                    collection.name, target.name, target.project, target.scope
                );
                targets.push(target);
            }
            Err(e) => failures.push(e),
        }
    }
    (targets, failures)
}

/// Run `requests` and report the outcome, prepending earlier failures
async fn run_batch(
    settings: &Settings,
    executor: &BatchExecutor<'_>,
    requests: Vec<PendingRequest<'_>>,
    failures: Vec<ComputeError>,
    message: &str,
    format: OutputFormat,
) -> Result<bool> {
    let spinner = create_spinner(message, settings.batch);
    let mut outcome = executor.execute(requests).await;
    let mut exceptions = failures;
    exceptions.append(&mut outcome.exceptions);
    outcome.exceptions = exceptions;
    finish_spinner_with_status(spinner, &outcome);

    output_batch(&outcome, format)?;
    Ok(batch_succeeded(&outcome))
}

/// List a collection across scopes (and projects, for images)
pub async fn run_list_command(
    client: &ComputeClient,
    settings: &Settings,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<bool> {
    let collection = args.collection;
    let is_images = collection.name == IMAGES.name;

    let mut projects = vec![settings.project.clone()];
    if is_images && !args.no_standard_images {
        projects.extend(images::STANDARD_IMAGE_PROJECTS.iter().map(|p| p.to_string()));
    }
    let result_filter: Option<ResultFilter> = if is_images && !args.old_images {
        Some(Arc::new(newest_images))
    } else {
        None
    };

    let request = ListRequest {
        projects,
        flags: args.scope.to_flags(),
        filter: args.filter.clone(),
        max_results: args.max_results,
        sort_by: args.sort_by.clone(),
        result_filter,
        ..Default::default()
    };

    let api = client.collection(collection);
    let lister = AggregatedLister::new(settings, client);
    let spinner = create_spinner(&format!("Listing {}...", collection.name), settings.batch);
    let result = lister.list(collection, &api, &request).await;
    clear_spinner(spinner);
    let result = result?;

    info!("Listed {} {}", result.items.len(), collection.name);
    output_list(&result, format)?;
    Ok(!result.warnings.iter().any(|w| w.code == REQUEST_FAILED))
}

/// Fetch and print one resource
pub async fn run_get_command(
    client: &ComputeClient,
    settings: &Settings,
    args: &GetArgs,
    format: OutputFormat,
) -> Result<bool> {
    let collection = args.collection;
    let api = client.collection(collection);
    let resolver = ScopeResolver::new(settings, client, prompt_for(settings));

    let scope = resolver
        .resolve_for_resource(collection, &api, &args.scope.to_flags(), &args.name)
        .await?;
    let target = Target::new(settings, scope, &args.name);
    let resource = api.get(&target.project, &target.scope, &target.name).await?;

    output_raw(&resource, format)?;
    Ok(true)
}

/// Delete resources, waiting for the operations in synchronous mode
pub async fn run_delete_command(
    client: &ComputeClient,
    settings: &Settings,
    args: &DeleteArgs,
    format: OutputFormat,
) -> Result<bool> {
    let collection = args.collection;
    if !confirm_delete(collection.name, &args.names, args.yes, settings.batch)? {
        eprintln!("Deletion cancelled.");
        return Ok(!settings.batch);
    }

    let api = client.collection(collection);
    let operations = client.collection(&OPERATIONS);
    let poller = OperationPoller::new(settings);
    let resolver = ScopeResolver::new(settings, client, prompt_for(settings));
    let (targets, failures) = resolve_targets(
        &resolver,
        settings,
        collection,
        &api,
        &args.scope.to_flags(),
        &args.names,
    )
    .await;

    let requests: Vec<PendingRequest<'_>> = targets
        .iter()
        .map(|target| api.delete(&target.project, &target.scope, &target.name))
        .collect();

    let mut executor = BatchExecutor::new(settings);
    if settings.synchronous {
        executor = executor.with_poller(&poller, &operations);
    }

    let message = format!("Deleting {} {}...", targets.len(), collection.name);
    run_batch(settings, &executor, requests, failures, &message, format).await
}

/// Read an insert body from `--body`: inline JSON or `@file`
fn parse_body(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            ComputeError::Usage(format!("Cannot read request body from '{}': {}", path, e))
        })?,
        None => raw.to_string(),
    };
    let body: Value = serde_json::from_str(&text)?;
    if !body.is_object() {
        return Err(ComputeError::Usage(
            "The request body must be a JSON object".to_string(),
        ));
    }
    Ok(body)
}

/// Insert one resource per name, all in the same scope
pub async fn run_insert_command(
    client: &ComputeClient,
    settings: &Settings,
    args: &InsertArgs,
    format: OutputFormat,
) -> Result<bool> {
    let collection = args.collection;
    let template = parse_body(&args.body)?;

    let resolver = ScopeResolver::new(settings, client, prompt_for(settings));
    let scope = resolver.resolve(collection, &args.scope.to_flags()).await?;
    debug!("Inserting {} into {}", collection.name, scope);

    let api = client.collection(collection);
    let operations = client.collection(&OPERATIONS);
    let poller = OperationPoller::new(settings);
    let project = settings.project.as_str();

    let requests: Vec<PendingRequest<'_>> = args
        .names
        .iter()
        .map(|name| {
            let mut body = template.clone();
            body["name"] = Value::String(denormalize(name));
            api.insert(project, &scope, body)
        })
        .collect();

    let mut executor = BatchExecutor::new(settings);
    if settings.synchronous {
        executor = executor.with_poller(&poller, &operations);
    }

    let message = format!("Inserting {} {}...", args.names.len(), collection.name);
    run_batch(settings, &executor, requests, Vec::new(), &message, format).await
}

/// How to tell that a resource of `collection` has settled
fn wait_spec(collection: &Collection) -> Result<PollSpec> {
    if collection.is_operations() {
        return Ok(PollSpec::OPERATION);
    }
    collection.resource_poll.ok_or_else(|| {
        ComputeError::Usage(format!(
            "{} have no state to wait for; use operations, disks, instances or snapshots",
            collection.name
        ))
    })
}

/// Wait until every named resource reaches a final state
pub async fn run_wait_command(
    client: &ComputeClient,
    settings: &Settings,
    args: &WaitArgs,
    format: OutputFormat,
) -> Result<bool> {
    let collection = args.collection;
    let spec = wait_spec(collection)?;

    let api = client.collection(collection);
    let poller = OperationPoller::new(settings);
    let resolver = ScopeResolver::new(settings, client, prompt_for(settings));
    let (targets, failures) = resolve_targets(
        &resolver,
        settings,
        collection,
        &api,
        &args.scope.to_flags(),
        &args.names,
    )
    .await;

    let (api, poller, spec) = (&api, &poller, &spec);
    let requests: Vec<PendingRequest<'_>> = targets
        .iter()
        .map(|target| {
            async move {
                let current = api.get(&target.project, &target.scope, &target.name).await?;
                Ok::<_, ComputeError>(poller.wait(current, spec, api).await)
            }
            .boxed()
        })
        .collect();

    let executor = BatchExecutor::new(settings);
    let message = format!("Waiting for {} {}...", targets.len(), collection.name);
    run_batch(settings, &executor, requests, failures, &message, format).await
}
