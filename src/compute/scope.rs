//! Request scopes (zone, region, global)

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use super::locator::denormalize;
use super::version::ApiVersion;
use crate::config::api;

/// The scope a single request applies to
///
/// The derived order lists zones first, then regions, then global, with
/// names ascending within a kind. Merged list output follows this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Zone(String),
    Region(String),
    Global,
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Zone(_) => ScopeKind::Zone,
            Scope::Region(_) => ScopeKind::Region,
            Scope::Global => ScopeKind::Global,
        }
    }

    /// Zone or region name, empty for global
    pub fn name(&self) -> &str {
        match self {
            Scope::Zone(name) | Scope::Region(name) => name,
            Scope::Global => "",
        }
    }

    /// Path segment used in resource URLs: `zones/<z>`, `regions/<r>` or `global`
    pub fn path_segment(&self) -> String {
        match self {
            Scope::Zone(name) => format!("zones/{}", name),
            Scope::Region(name) => format!("regions/{}", name),
            Scope::Global => api::GLOBAL_SCOPE_NAME.to_string(),
        }
    }

    /// Parse a bucket key from an aggregated list response
    ///
    /// Keys are `zones/<z>`, `regions/<r>` or `global`. A bare key is
    /// read as a zone name, which older responses used.
    pub fn from_bucket_key(key: &str) -> Scope {
        let key = key.trim_matches('/');
        if key == api::GLOBAL_SCOPE_NAME {
            return Scope::Global;
        }
        if let Some(zone) = key.strip_prefix("zones/") {
            return Scope::Zone(zone.to_string());
        }
        if let Some(region) = key.strip_prefix("regions/") {
            return Scope::Region(region.to_string());
        }
        Scope::Zone(key.to_string())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Kind of scope, without a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeKind {
    Zone,
    Region,
    Global,
}

impl ScopeKind {
    /// Singular label, e.g. "zone"
    pub fn label(&self) -> &'static str {
        match self {
            ScopeKind::Zone => "zone",
            ScopeKind::Region => "region",
            ScopeKind::Global => "global",
        }
    }

    /// Command-line flag selecting this kind
    pub fn flag(&self) -> &'static str {
        match self {
            ScopeKind::Zone => "--zone",
            ScopeKind::Region => "--region",
            ScopeKind::Global => "--global",
        }
    }
}

/// Set of scope kinds a collection supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeKinds {
    zone: bool,
    region: bool,
    global: bool,
}

impl ScopeKinds {
    pub const ZONE: ScopeKinds = ScopeKinds {
        zone: true,
        region: false,
        global: false,
    };
    pub const REGION: ScopeKinds = ScopeKinds {
        zone: false,
        region: true,
        global: false,
    };
    pub const GLOBAL: ScopeKinds = ScopeKinds {
        zone: false,
        region: false,
        global: true,
    };
    pub const ALL: ScopeKinds = ScopeKinds {
        zone: true,
        region: true,
        global: true,
    };

    /// Union of two sets
    pub const fn with(self, other: ScopeKinds) -> ScopeKinds {
        ScopeKinds {
            zone: self.zone || other.zone,
            region: self.region || other.region,
            global: self.global || other.global,
        }
    }

    pub fn contains(&self, kind: ScopeKind) -> bool {
        match kind {
            ScopeKind::Zone => self.zone,
            ScopeKind::Region => self.region,
            ScopeKind::Global => self.global,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.zone && !self.region && !self.global
    }

    /// Kinds in merge order (zone, region, global)
    pub fn kinds(&self) -> Vec<ScopeKind> {
        [ScopeKind::Zone, ScopeKind::Region, ScopeKind::Global]
            .into_iter()
            .filter(|k| self.contains(*k))
            .collect()
    }

    /// The only kind in the set, if there is exactly one
    pub fn single(&self) -> Option<ScopeKind> {
        match self.kinds().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Kinds addressable at `version`
    ///
    /// Regions are dropped before they existed. An empty result is
    /// treated as global.
    pub fn effective(&self, version: ApiVersion) -> ScopeKinds {
        let effective = ScopeKinds {
            zone: self.zone,
            region: self.region && version.has_regions(),
            global: self.global,
        };
        if effective.is_empty() {
            ScopeKinds::GLOBAL
        } else {
            effective
        }
    }

    /// Flags for the kinds in the set, e.g. "--zone or --global"
    pub fn flags(&self) -> String {
        self.kinds()
            .iter()
            .map(|k| k.flag())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Scope flags as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFlags {
    pub zone: Option<String>,
    pub region: Option<String>,
    pub global: bool,
}

impl ScopeFlags {
    /// No scope flag was given (empty values count as absent)
    pub fn is_empty(&self) -> bool {
        self.pinned().is_empty()
    }

    /// Scopes pinned by the flags, deduplicated and in merge order
    ///
    /// Zone and region values may be names, paths or URLs.
    /// `--zone global` pins global scope and logs a deprecation warning.
    pub fn pinned(&self) -> Vec<Scope> {
        let mut scopes = BTreeSet::new();

        if let Some(zone) = non_empty(self.zone.as_deref()) {
            let name = denormalize(zone);
            if name == api::GLOBAL_SCOPE_NAME {
                warn!("'--zone global' is deprecated, use '--global' instead");
                scopes.insert(Scope::Global);
            } else if !name.is_empty() {
                scopes.insert(Scope::Zone(name));
            }
        }
        if let Some(region) = non_empty(self.region.as_deref()) {
            let name = denormalize(region);
            if !name.is_empty() {
                scopes.insert(Scope::Region(name));
            }
        }
        if self.global {
            scopes.insert(Scope::Global);
        }

        scopes.into_iter().collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
