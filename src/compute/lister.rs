//! Listing across scopes and projects
//!
//! A list command covers every scope the collection lives in. When the
//! collection offers an aggregated call and nothing is pinned, one
//! paginated call covers all scopes. Otherwise each scope is listed
//! separately (concurrently, paginating sequentially within a scope) and
//! the results are merged in scope order: zones, then regions, then global.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde_json::Value;

use super::collection::Collection;
use super::models::{
    AggregatedResult, ListWarning, ScopeWarning, ScopedList, REQUEST_FAILED,
};
use super::scope::{Scope, ScopeFlags, ScopeKind};
use super::traits::{CollectionApi, PageRequest, Paginated, ScopeCatalog};
use crate::config::Settings;
use crate::error::{ComputeError, Result};

/// Post-processing hook applied to merged items
pub type ResultFilter = Arc<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>;

/// What to list
#[derive(Clone, Default)]
pub struct ListRequest {
    /// Projects to list, in order; duplicates are skipped
    pub projects: Vec<String>,
    pub flags: ScopeFlags,
    /// Server-side filter expression
    pub filter: Option<String>,
    /// Page size hint
    pub max_results: Option<u32>,
    /// Field to sort by, `-field` for descending; overrides the collection default
    pub sort_by: Option<String>,
    /// Fail on the first scope that cannot be listed instead of warning
    pub strict: bool,
    /// Applied last; must not reorder the items it keeps
    pub result_filter: Option<ResultFilter>,
}

impl ListRequest {
    pub fn for_project(project: &str) -> Self {
        Self {
            projects: vec![project.to_string()],
            ..Default::default()
        }
    }

    fn page(&self) -> PageRequest {
        PageRequest {
            token: None,
            filter: self.filter.clone(),
            max_results: self.max_results,
        }
    }
}

/// Fetch every page of a paginated call
///
/// `fetch` receives the continuation token (`None` for the first page).
/// Stops when a page carries no token, or repeats the previous one.
pub async fn fetch_all_pages<P, F, Fut>(mut fetch: F) -> Result<Vec<P>>
where
    P: Paginated,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    let mut pages = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch(token.clone()).await?;
        let next = page.next_page_token().map(String::from);
        pages.push(page);

        match next {
            Some(next) if token.as_deref() == Some(next.as_str()) => {
                warn!("Server repeated page token '{}', stopping", next);
                break;
            }
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!("Fetched {} page(s)", pages.len());
    Ok(pages)
}

/// Lists a collection across scopes and projects
pub struct AggregatedLister<'a> {
    settings: &'a Settings,
    catalog: &'a dyn ScopeCatalog,
}

impl<'a> AggregatedLister<'a> {
    pub fn new(settings: &'a Settings, catalog: &'a dyn ScopeCatalog) -> Self {
        Self { settings, catalog }
    }

    /// List `collection` for every project of the request
    ///
    /// A scope whose list call fails is recorded as a `REQUEST_FAILED`
    /// warning, or returned as the error for a strict request. Failing to
    /// enumerate zones or regions is an error.
    pub async fn list(
        &self,
        collection: &Collection,
        api: &dyn CollectionApi,
        request: &ListRequest,
    ) -> Result<AggregatedResult> {
        let mut seen = BTreeSet::new();
        let projects: Vec<&String> = request
            .projects
            .iter()
            .filter(|p| seen.insert(p.as_str()))
            .collect();

        let mut merged = AggregatedResult::default();
        for project in projects {
            let part = self.list_project(collection, api, project, request).await?;
            debug!(
                "Listed {} {} in project '{}'",
                part.items.len(),
                collection.name,
                project
            );
            merged.extend(part);
        }

        if let Some(sort) = request.sort_by.as_deref().or(collection.default_sort) {
            sort_items(&mut merged.items, sort);
        }

        if let Some(filter) = &request.result_filter {
            merged.items = filter(merged.items);
        }

        Ok(merged)
    }

    async fn list_project(
        &self,
        collection: &Collection,
        api: &dyn CollectionApi,
        project: &str,
        request: &ListRequest,
    ) -> Result<AggregatedResult> {
        if request.flags.is_empty() && collection.uses_aggregated_list(self.settings.version) {
            return self.list_aggregated(collection, api, project, request).await;
        }

        let scopes = self.scopes_to_list(collection, project, &request.flags).await?;
        debug!("Listing {} in {} scope(s)", collection.name, scopes.len());

        let page = request.page();
        let buckets: Vec<(Scope, Result<ScopedList>)> = stream::iter(scopes)
            .map(|scope| {
                let page = page.clone();
                async move {
                    let result = list_scope(api, project, &scope, page).await;
                    (scope, result)
                }
            })
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut ordered: BTreeMap<Scope, ScopedList> = BTreeMap::new();
        let mut failed: Vec<(Scope, ComputeError)> = Vec::new();
        for (scope, result) in buckets {
            match result {
                Ok(list) => {
                    ordered.insert(scope, list);
                }
                Err(e) => failed.push((scope, e)),
            }
        }

        failed.sort_by(|a, b| a.0.cmp(&b.0));
        if request.strict && !failed.is_empty() {
            let (scope, e) = failed.remove(0);
            debug!("Listing {} in {} failed", collection.name, scope);
            return Err(e);
        }

        let mut result = merge_buckets(ordered);
        for (scope, e) in failed {
            warn!("Failed to list {} in {}: {}", collection.name, scope, e);
            result.warnings.push(ScopeWarning::new(
                &scope,
                ListWarning::new(REQUEST_FAILED, e.to_string()),
            ));
        }
        Ok(result)
    }

    async fn list_aggregated(
        &self,
        collection: &Collection,
        api: &dyn CollectionApi,
        project: &str,
        request: &ListRequest,
    ) -> Result<AggregatedResult> {
        debug!("Using aggregated list for {}", collection.name);
        let page = request.page();
        let pages =
            fetch_all_pages(|token| api.aggregated_list(project, page.continued(token))).await?;

        let mut ordered: BTreeMap<Scope, ScopedList> = BTreeMap::new();
        for page in pages {
            for (key, list) in page.buckets {
                let bucket = ordered.entry(Scope::from_bucket_key(&key)).or_default();
                bucket.items.extend(list.items);
                if list.warning.is_some() {
                    bucket.warning = list.warning;
                }
            }
        }

        Ok(merge_buckets(ordered))
    }

    /// Scopes to list when nothing can be aggregated
    async fn scopes_to_list(
        &self,
        collection: &Collection,
        project: &str,
        flags: &ScopeFlags,
    ) -> Result<Vec<Scope>> {
        let version = self.settings.version;
        let kinds = collection.scope_kinds.effective(version);

        if collection.top_level || !version.has_scoped_paths() {
            // one unscoped list call covers the collection
            return Ok(vec![Scope::Global]);
        }

        let pinned = flags.pinned();
        if !pinned.is_empty() {
            for scope in &pinned {
                if !kinds.contains(scope.kind()) {
                    return Err(ComputeError::Usage(format!(
                        "{} does not apply to {}; use {}",
                        scope.kind().flag(),
                        collection.name,
                        kinds.flags()
                    )));
                }
            }
            return Ok(pinned);
        }

        let mut scopes = Vec::new();
        if kinds.contains(ScopeKind::Zone) {
            let mut zones = self.catalog.list_zones(project).await?;
            zones.sort();
            scopes.extend(zones.into_iter().map(Scope::Zone));
        }
        if kinds.contains(ScopeKind::Region) {
            let mut regions = self.catalog.list_regions(project).await?;
            regions.sort();
            scopes.extend(regions.into_iter().map(Scope::Region));
        }
        if kinds.contains(ScopeKind::Global) {
            scopes.push(Scope::Global);
        }
        Ok(scopes)
    }
}

/// Every page of one scope, concatenated
async fn list_scope(
    api: &dyn CollectionApi,
    project: &str,
    scope: &Scope,
    page: PageRequest,
) -> Result<ScopedList> {
    let pages = fetch_all_pages(|token| api.list(project, scope, page.continued(token))).await?;

    let mut merged = ScopedList::default();
    for page in pages {
        merged.items.extend(page.items);
        if page.warning.is_some() {
            merged.warning = page.warning;
        }
    }
    Ok(merged)
}

/// Flatten buckets in scope order
///
/// Warnings are kept only for buckets without items, and only when they
/// say more than "no results".
fn merge_buckets(buckets: BTreeMap<Scope, ScopedList>) -> AggregatedResult {
    let mut result = AggregatedResult::default();
    for (scope, list) in buckets {
        if list.items.is_empty() {
            if let Some(warning) = list.warning.filter(ListWarning::is_significant) {
                result.warnings.push(ScopeWarning::new(&scope, warning));
            }
        }
        result.items.extend(list.items);
    }
    result
}

/// Stable sort by a field, `-field` for descending order
///
/// Skipped unless every item has the field.
fn sort_items(items: &mut [Value], sort: &str) {
    let (key, descending) = match sort.strip_prefix('-') {
        Some(key) => (key, true),
        None => (sort, false),
    };
    if !items.iter().all(|item| item.get(key).is_some()) {
        debug!("Not every item has '{}', leaving list unsorted", key);
        return;
    }
    if descending {
        items.sort_by(|a, b| compare_values(&b[key], &a[key]));
    } else {
        items.sort_by(|a, b| compare_values(&a[key], &b[key]));
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
