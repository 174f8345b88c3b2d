//! Scope resolution
//!
//! Works out which zone, region or global scope a request applies to:
//! 1. Scope flags (exactly one)
//! 2. Scope embedded in a resource reference
//! 3. Lookup of the resource by name across all scopes
//! 4. Settings default (zone or region)
//! 5. Catalog listing:
//!    - If 1 candidate: use it
//!    - If several: interactive selection (or error in batch mode)
//!    - If none: error

use log::{debug, info};

use super::collection::Collection;
use super::lister::{AggregatedLister, ListRequest};
use super::locator::{denormalize, extract_project, extract_scope};
use super::scope::{Scope, ScopeFlags, ScopeKind, ScopeKinds};
use super::traits::{ChoicePrompt, CollectionApi, ComputeResource, ScopeCatalog};
use crate::config::Settings;
use crate::error::{ComputeError, Result};

/// Resolves the scope of a request
pub struct ScopeResolver<'a> {
    settings: &'a Settings,
    catalog: &'a dyn ScopeCatalog,
    /// `None` in batch mode
    prompt: Option<&'a dyn ChoicePrompt>,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(
        settings: &'a Settings,
        catalog: &'a dyn ScopeCatalog,
        prompt: Option<&'a dyn ChoicePrompt>,
    ) -> Self {
        Self {
            settings,
            catalog,
            prompt,
        }
    }

    /// Scope for a request against `collection`, from flags or defaults
    pub async fn resolve(&self, collection: &Collection, flags: &ScopeFlags) -> Result<Scope> {
        let kinds = collection.scope_kinds.effective(self.settings.version);

        if let Some(scope) = self.pinned_scope(collection, kinds, flags)? {
            debug!("Using scope from flags: {}", scope);
            return Ok(scope);
        }

        if collection.top_level {
            return Ok(Scope::Global);
        }

        match kinds.single() {
            Some(ScopeKind::Global) => Ok(Scope::Global),
            Some(ScopeKind::Zone) => {
                if let Some(zone) = &self.settings.default_zone {
                    debug!("Using default zone: {}", zone);
                    return Ok(Scope::Zone(denormalize(zone)));
                }
                let zones = self.catalog.list_zones(&self.settings.project).await?;
                self.choose_one(ScopeKind::Zone, zones).map(Scope::Zone)
            }
            Some(ScopeKind::Region) => {
                if let Some(region) = &self.settings.default_region {
                    debug!("Using default region: {}", region);
                    return Ok(Scope::Region(denormalize(region)));
                }
                let regions = self.catalog.list_regions(&self.settings.project).await?;
                self.choose_one(ScopeKind::Region, regions).map(Scope::Region)
            }
            None => Err(ComputeError::Usage(format!(
                "{} spans several scopes; specify {}",
                collection.name,
                kinds.flags()
            ))),
        }
    }

    /// Scope of an existing resource
    ///
    /// Flags win, then a scope carried by `reference`. Otherwise the
    /// resource is looked up by name across all scopes; a single match
    /// gives its scope, several are offered as a choice and none falls back
    /// to [`resolve`](Self::resolve).
    pub async fn resolve_for_resource(
        &self,
        collection: &Collection,
        api: &dyn CollectionApi,
        flags: &ScopeFlags,
        reference: &str,
    ) -> Result<Scope> {
        if !flags.is_empty() || collection.top_level {
            return self.resolve(collection, flags).await;
        }

        let kinds = collection.scope_kinds.effective(self.settings.version);
        if kinds.single() == Some(ScopeKind::Global) {
            return Ok(Scope::Global);
        }

        if let Some(scope) = extract_scope(reference) {
            debug!("Using scope from reference '{}': {}", reference, scope);
            return Ok(scope);
        }

        let name = denormalize(reference);
        let project = extract_project(reference).unwrap_or_else(|| self.settings.project.clone());
        debug!(
            "Looking up scope of {} '{}' in project '{}'",
            collection.name, name, project
        );
        let lister = AggregatedLister::new(self.settings, self.catalog);
        let request = ListRequest {
            filter: Some(format!("name eq {}", name)),
            strict: true,
            ..ListRequest::for_project(&project)
        };
        let found = lister.list(collection, api, &request).await?;

        let mut scopes: Vec<Scope> = found
            .items
            .iter()
            .filter(|item| item.name() == Some(name.as_str()))
            .filter_map(|item| item.self_link().and_then(extract_scope))
            .collect();
        scopes.sort();
        scopes.dedup();

        match scopes.len() {
            0 => {
                debug!("'{}' not found in any scope", name);
                self.resolve(collection, flags).await
            }
            1 => Ok(scopes.remove(0)),
            _ => {
                let labels: Vec<String> = scopes.iter().map(Scope::path_segment).collect();
                let prompt = self.prompt.ok_or_else(|| {
                    ComputeError::Usage(format!(
                        "{} '{}' exists in several scopes ({}); specify {}",
                        collection.name,
                        name,
                        labels.join(", "),
                        kinds.flags()
                    ))
                })?;
                let index = prompt.choose(&format!("{} '{}'", collection.name, name), &labels)?;
                if index >= scopes.len() {
                    return Err(ComputeError::Prompt(format!("Invalid selection {}", index)));
                }
                Ok(scopes.swap_remove(index))
            }
        }
    }

    /// The single scope given by flags, if any
    fn pinned_scope(
        &self,
        collection: &Collection,
        kinds: ScopeKinds,
        flags: &ScopeFlags,
    ) -> Result<Option<Scope>> {
        let mut pinned = flags.pinned();
        match pinned.len() {
            0 => Ok(None),
            1 => {
                let scope = pinned.remove(0);
                if !collection.top_level && !kinds.contains(scope.kind()) {
                    return Err(ComputeError::Usage(format!(
                        "{} does not apply to {}; use {}",
                        scope.kind().flag(),
                        collection.name,
                        kinds.flags()
                    )));
                }
                Ok(Some(scope))
            }
            _ => Err(ComputeError::Usage(
                "Specify only one of --zone, --region or --global".to_string(),
            )),
        }
    }

    /// Pick one candidate, prompting when there are several
    fn choose_one(&self, kind: ScopeKind, mut candidates: Vec<String>) -> Result<String> {
        candidates.sort();
        candidates.dedup();

        match candidates.len() {
            0 => Err(ComputeError::Command(format!(
                "No {}s found in project '{}'",
                kind.label(),
                self.settings.project
            ))),
            1 => {
                let only = candidates.remove(0);
                info!("Selecting the only available {}: {}", kind.label(), only);
                Ok(only)
            }
            _ => {
                let prompt = self.prompt.ok_or_else(|| {
                    ComputeError::Usage(format!(
                        "{} is required in batch mode (available: {})",
                        kind.flag(),
                        candidates.join(", ")
                    ))
                })?;
                let index = prompt.choose(kind.label(), &candidates)?;
                if index >= candidates.len() {
                    return Err(ComputeError::Prompt(format!("Invalid selection {}", index)));
                }
                let chosen = candidates.swap_remove(index);
                debug!("User selected {}: {}", kind.label(), chosen);
                Ok(chosen)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::collection::{ADDRESSES, DISKS, IMAGES, OPERATIONS, ZONES};
    use crate::compute::models::{AggregatedPage, ScopedList};
    use crate::compute::traits::PageRequest;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FakeCatalog {
        zones: Vec<&'static str>,
        regions: Vec<&'static str>,
    }

    impl ScopeCatalog for FakeCatalog {
        fn list_zones<'a>(&'a self, _project: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
            let zones = self.zones.iter().map(|z| z.to_string()).collect();
            async move { Ok(zones) }.boxed()
        }

        fn list_regions<'a>(&'a self, _project: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
            let regions = self.regions.iter().map(|r| r.to_string()).collect();
            async move { Ok(regions) }.boxed()
        }
    }

    /// Records the labels it was shown and answers with a fixed index
    struct FakePrompt {
        answer: usize,
        shown: Mutex<Vec<String>>,
    }

    impl FakePrompt {
        fn answering(answer: usize) -> Self {
            Self {
                answer,
                shown: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChoicePrompt for FakePrompt {
        fn choose(&self, _label: &str, choices: &[String]) -> Result<usize> {
            self.shown.lock().unwrap().extend(choices.iter().cloned());
            Ok(self.answer)
        }
    }

    /// Aggregated listing that returns fixed disks
    #[derive(Default)]
    struct FakeDisks {
        items: Vec<Value>,
        fail: bool,
        /// Projects the lookups were made in
        projects: Mutex<Vec<String>>,
    }

    fn internal_error() -> ComputeError {
        ComputeError::Api {
            status: 500,
            message: "internal".to_string(),
        }
    }

    impl CollectionApi for FakeDisks {
        fn name(&self) -> &str {
            "disks"
        }

        fn get<'a>(&'a self, _p: &'a str, _s: &'a Scope, _n: &'a str) -> BoxFuture<'a, Result<Value>> {
            async { Ok(Value::Null) }.boxed()
        }

        fn insert<'a>(&'a self, _p: &'a str, _s: &'a Scope, _b: Value) -> BoxFuture<'a, Result<Value>> {
            async { Ok(Value::Null) }.boxed()
        }

        fn delete<'a>(&'a self, _p: &'a str, _s: &'a Scope, _n: &'a str) -> BoxFuture<'a, Result<Value>> {
            async { Ok(Value::Null) }.boxed()
        }

        fn list<'a>(&'a self, p: &'a str, _s: &'a Scope, _page: PageRequest) -> BoxFuture<'a, Result<ScopedList>> {
            self.projects.lock().unwrap().push(p.to_string());
            let result = if self.fail {
                Err(internal_error())
            } else {
                Ok(ScopedList::default())
            };
            async move { result }.boxed()
        }

        fn aggregated_list<'a>(&'a self, p: &'a str, _page: PageRequest) -> BoxFuture<'a, Result<AggregatedPage>> {
            self.projects.lock().unwrap().push(p.to_string());
            if self.fail {
                return async { Err(internal_error()) }.boxed();
            }
            let mut page = AggregatedPage::default();
            for item in &self.items {
                let key = extract_scope(item.self_link().unwrap_or_default())
                    .map(|s| s.path_segment())
                    .unwrap_or_default();
                page.buckets
                    .entry(key)
                    .or_insert_with(ScopedList::default)
                    .items
                    .push(item.clone());
            }
            async move { Ok(page) }.boxed()
        }
    }

    fn disk(zone: &str, name: &str) -> Value {
        json!({
            "name": name,
            "selfLink": format!("https://h/compute/v1beta15/projects/p/zones/{}/disks/{}", zone, name)
        })
    }

    fn catalog(zones: Vec<&'static str>) -> FakeCatalog {
        FakeCatalog {
            zones,
            regions: vec!["r1", "r2"],
        }
    }

    fn zone_flag(zone: &str) -> ScopeFlags {
        ScopeFlags {
            zone: Some(zone.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_flag_wins() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver.resolve(&DISKS, &zone_flag("zones/b")).await.unwrap();
        assert_eq!(scope, Scope::Zone("b".to_string()));
    }

    #[tokio::test]
    async fn test_conflicting_flags_are_usage_error() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let flags = ScopeFlags {
            zone: Some("a".to_string()),
            region: None,
            global: true,
        };
        let err = resolver.resolve(&OPERATIONS, &flags).await.unwrap_err();
        assert!(matches!(err, ComputeError::Usage(_)));
    }

    #[tokio::test]
    async fn test_zone_global_alias_resolves_global() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver.resolve(&OPERATIONS, &zone_flag("global")).await.unwrap();
        assert_eq!(scope, Scope::Global);
    }

    #[tokio::test]
    async fn test_flag_of_wrong_kind() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver.resolve(&IMAGES, &zone_flag("a")).await.unwrap_err();
        assert!(err.to_string().contains("--global"));
    }

    #[tokio::test]
    async fn test_global_collection_needs_no_lookup() {
        let settings = Settings::new("p");
        let catalog = catalog(vec![]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        assert_eq!(
            resolver.resolve(&IMAGES, &ScopeFlags::default()).await.unwrap(),
            Scope::Global
        );
        assert_eq!(
            resolver.resolve(&ZONES, &ScopeFlags::default()).await.unwrap(),
            Scope::Global
        );
    }

    #[tokio::test]
    async fn test_single_zone_is_auto_selected() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["only-zone"]);
        let prompt = FakePrompt::answering(0);
        let resolver = ScopeResolver::new(&settings, &catalog, Some(&prompt));
        let scope = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap();
        assert_eq!(scope, Scope::Zone("only-zone".to_string()));
        assert!(prompt.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_zones_is_command_error() {
        let settings = Settings::new("p");
        let catalog = catalog(vec![]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap_err();
        assert!(matches!(err, ComputeError::Command(_)));
    }

    #[tokio::test]
    async fn test_several_zones_prompt_in_sorted_order() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["c", "a", "b"]);
        let prompt = FakePrompt::answering(1);
        let resolver = ScopeResolver::new(&settings, &catalog, Some(&prompt));
        let scope = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap();
        assert_eq!(scope, Scope::Zone("b".to_string()));
        assert_eq!(*prompt.shown.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_several_zones_in_batch_mode_is_usage_error() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap_err();
        match err {
            ComputeError::Usage(msg) => assert!(msg.contains("--zone")),
            other => panic!("Expected usage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_prompt_answer() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let prompt = FakePrompt::answering(7);
        let resolver = ScopeResolver::new(&settings, &catalog, Some(&prompt));
        let err = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap_err();
        assert!(matches!(err, ComputeError::Prompt(_)));
    }

    #[tokio::test]
    async fn test_default_zone_from_settings() {
        let mut settings = Settings::new("p");
        settings.default_zone = Some("zones/home".to_string());
        let catalog = catalog(vec!["a", "b"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver.resolve(&DISKS, &ScopeFlags::default()).await.unwrap();
        assert_eq!(scope, Scope::Zone("home".to_string()));
    }

    #[tokio::test]
    async fn test_region_collection() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let prompt = FakePrompt::answering(1);
        let resolver = ScopeResolver::new(&settings, &catalog, Some(&prompt));
        let scope = resolver.resolve(&ADDRESSES, &ScopeFlags::default()).await.unwrap();
        assert_eq!(scope, Scope::Region("r2".to_string()));
    }

    #[tokio::test]
    async fn test_multi_kind_collection_without_flag() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver.resolve(&OPERATIONS, &ScopeFlags::default()).await.unwrap_err();
        assert!(matches!(err, ComputeError::Usage(_)));
    }

    #[tokio::test]
    async fn test_resource_scope_from_reference() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let api = FakeDisks {
            items: vec![],
            fail: true,
            ..Default::default()
        };
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "projects/p/zones/b/disks/d1")
            .await
            .unwrap();
        assert_eq!(scope, Scope::Zone("b".to_string()));
    }

    #[tokio::test]
    async fn test_resource_scope_from_single_match() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let api = FakeDisks {
            items: vec![disk("a", "other"), disk("b", "d1")],
            fail: false,
            ..Default::default()
        };
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "d1")
            .await
            .unwrap();
        assert_eq!(scope, Scope::Zone("b".to_string()));
    }

    #[tokio::test]
    async fn test_resource_in_several_scopes_prompts() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a", "b"]);
        let api = FakeDisks {
            items: vec![disk("b", "d1"), disk("a", "d1")],
            fail: false,
            ..Default::default()
        };
        let prompt = FakePrompt::answering(1);
        let resolver = ScopeResolver::new(&settings, &catalog, Some(&prompt));
        let scope = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "d1")
            .await
            .unwrap();
        assert_eq!(scope, Scope::Zone("b".to_string()));
        assert_eq!(*prompt.shown.lock().unwrap(), vec!["zones/a", "zones/b"]);
    }

    #[tokio::test]
    async fn test_resource_not_found_falls_back_to_resolve() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["only"]);
        let api = FakeDisks {
            items: vec![disk("only", "other")],
            fail: false,
            ..Default::default()
        };
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "d1")
            .await
            .unwrap();
        assert_eq!(scope, Scope::Zone("only".to_string()));
    }

    #[tokio::test]
    async fn test_resource_lookup_failure_propagates() {
        let settings = Settings::new("p");
        let catalog = catalog(vec!["a"]);
        let api = FakeDisks {
            items: vec![],
            fail: true,
            ..Default::default()
        };
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "d1")
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_per_scope_lookup_failure_propagates() {
        let mut settings = Settings::new("p");
        settings.version = "v1beta14".parse().unwrap();
        let catalog = catalog(vec!["a"]);
        let api = FakeDisks {
            fail: true,
            ..Default::default()
        };
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let err = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "d1")
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_lookup_uses_project_of_reference() {
        let settings = Settings::new("other");
        let catalog = catalog(vec!["a"]);
        let api = FakeDisks::default();
        let resolver = ScopeResolver::new(&settings, &catalog, None);
        let scope = resolver
            .resolve_for_resource(&DISKS, &api, &ScopeFlags::default(), "projects/acme/disks/d1")
            .await
            .unwrap();
        assert_eq!(scope, Scope::Zone("a".to_string()));
        assert_eq!(*api.projects.lock().unwrap(), vec!["acme"]);
    }
}
