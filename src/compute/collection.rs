//! Capability descriptors of the known resource collections
//!
//! A collection is described by data: the scope kinds it lives in, whether
//! it offers an aggregated list call, its default sort key and how to wait
//! for its resources. Commands look descriptors up by name instead of
//! subclassing per resource type.

use super::poller::PollSpec;
use super::scope::{ScopeKind, ScopeKinds};
use super::version::ApiVersion;

/// Capabilities of one resource collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Collection name as used in URLs, e.g. "machineTypes"
    pub name: &'static str,
    /// Accepted alternative names, e.g. "disk"
    pub aliases: &'static [&'static str],
    /// Scope kinds the collection lives in
    pub scope_kinds: ScopeKinds,
    /// Version-independent collection (no scope segment in URLs)
    pub top_level: bool,
    /// Offers `projects/<p>/aggregated/<name>`
    pub aggregated: bool,
    /// Client-side sort key for merged list output
    pub default_sort: Option<&'static str>,
    /// How to wait for a resource of this collection to settle
    pub resource_poll: Option<PollSpec>,
}

impl Collection {
    const fn new(name: &'static str, scope_kinds: ScopeKinds) -> Self {
        Self {
            name,
            aliases: &[],
            scope_kinds,
            top_level: false,
            aggregated: false,
            default_sort: None,
            resource_poll: None,
        }
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    const fn aggregated(mut self) -> Self {
        self.aggregated = true;
        self
    }

    const fn sort_by(mut self, key: &'static str) -> Self {
        self.default_sort = Some(key);
        self
    }

    const fn poll(mut self, spec: PollSpec) -> Self {
        self.resource_poll = Some(spec);
        self
    }

    /// Whether the aggregated list call can be used at `version`
    pub fn uses_aggregated_list(&self, version: ApiVersion) -> bool {
        self.aggregated && version.has_aggregated_list()
    }

    /// Whether this is the operations collection
    pub fn is_operations(&self) -> bool {
        self.name == OPERATIONS.name
    }

    /// Whether the collection lives in zones at `version`
    pub fn is_zonal(&self, version: ApiVersion) -> bool {
        !self.top_level && self.scope_kinds.effective(version).contains(ScopeKind::Zone)
    }

    fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }
}

pub const ADDRESSES: Collection = Collection::new("addresses", ScopeKinds::REGION)
    .aliases(&["address"])
    .aggregated()
    .sort_by("name");

pub const DISKS: Collection = Collection::new("disks", ScopeKinds::ZONE)
    .aliases(&["disk"])
    .aggregated()
    .sort_by("name")
    .poll(PollSpec::DISK);

pub const FIREWALLS: Collection = Collection::new("firewalls", ScopeKinds::GLOBAL)
    .aliases(&["firewall"])
    .sort_by("name");

pub const IMAGES: Collection = Collection::new("images", ScopeKinds::GLOBAL)
    .aliases(&["image"])
    .sort_by("name");

pub const INSTANCES: Collection = Collection::new("instances", ScopeKinds::ZONE)
    .aliases(&["instance"])
    .aggregated()
    .sort_by("name")
    .poll(PollSpec::INSTANCE);

pub const KERNELS: Collection = Collection::new("kernels", ScopeKinds::GLOBAL)
    .aliases(&["kernel"])
    .sort_by("name");

pub const MACHINE_TYPES: Collection = Collection::new("machineTypes", ScopeKinds::ZONE)
    .aliases(&["machine-types", "machinetype"])
    .aggregated()
    .sort_by("name");

pub const NETWORKS: Collection = Collection::new("networks", ScopeKinds::GLOBAL)
    .aliases(&["network"])
    .sort_by("name");

pub const OPERATIONS: Collection = Collection::new("operations", ScopeKinds::ALL)
    .aliases(&["operation"])
    .aggregated();

pub const ROUTES: Collection = Collection::new("routes", ScopeKinds::GLOBAL)
    .aliases(&["route"])
    .sort_by("name");

pub const SNAPSHOTS: Collection = Collection::new("snapshots", ScopeKinds::GLOBAL)
    .aliases(&["snapshot"])
    .sort_by("name")
    .poll(PollSpec::SNAPSHOT);

pub const ZONES: Collection = Collection::new("zones", ScopeKinds::GLOBAL)
    .aliases(&["zone"])
    .top_level()
    .sort_by("name");

pub const REGIONS: Collection = Collection::new("regions", ScopeKinds::GLOBAL)
    .aliases(&["region"])
    .top_level()
    .sort_by("name");

/// Every known collection
pub const ALL_COLLECTIONS: &[&Collection] = &[
    &ADDRESSES,
    &DISKS,
    &FIREWALLS,
    &IMAGES,
    &INSTANCES,
    &KERNELS,
    &MACHINE_TYPES,
    &NETWORKS,
    &OPERATIONS,
    &ROUTES,
    &SNAPSHOTS,
    &ZONES,
    &REGIONS,
];

/// Find a collection by name or alias (case-insensitive)
pub fn find_collection(name: &str) -> Option<&'static Collection> {
    ALL_COLLECTIONS.iter().copied().find(|c| c.matches(name))
}

/// Names of all known collections, for error messages
pub fn collection_names() -> Vec<&'static str> {
    ALL_COLLECTIONS.iter().map(|c| c.name).collect()
}
