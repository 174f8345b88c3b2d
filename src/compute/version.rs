//! API version tokens
//!
//! Versions look like `v1beta15` or `v1`. They are ordered numerically:
//! `v1beta4 < v1beta15 < v1 < v2beta1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// A parsed API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    major: u32,
    /// `None` for a GA release
    beta: Option<u32>,
}

/// Resource paths carry a scope segment from this version on
pub const SCOPED_PATHS: ApiVersion = ApiVersion::beta(1, 14);

/// Region scopes and aggregated list calls exist from this version on
pub const REGIONS: ApiVersion = ApiVersion::beta(1, 15);

impl ApiVersion {
    /// A beta version, e.g. `beta(1, 15)` is `v1beta15`
    pub const fn beta(major: u32, beta: u32) -> Self {
        Self {
            major,
            beta: Some(beta),
        }
    }

    /// A GA version, e.g. `ga(1)` is `v1`
    pub const fn ga(major: u32) -> Self {
        Self { major, beta: None }
    }

    /// Check if this version is `other` or newer
    pub fn is_at_least(&self, other: ApiVersion) -> bool {
        *self >= other
    }

    /// Whether resource paths include `zones/<z>`, `regions/<r>` or `global`
    pub fn has_scoped_paths(&self) -> bool {
        self.is_at_least(SCOPED_PATHS)
    }

    /// Whether region-scoped collections are addressable
    pub fn has_regions(&self) -> bool {
        self.is_at_least(REGIONS)
    }

    /// Whether collections may offer an aggregated list call
    pub fn has_aggregated_list(&self) -> bool {
        self.is_at_least(REGIONS)
    }

    /// Whether the zone travels in the request body instead of the path
    pub fn zone_in_body(&self) -> bool {
        !self.has_scoped_paths()
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        REGIONS
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| match (self.beta, other.beta) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for ApiVersion {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ComputeError::Command(format!(
                "Invalid API version '{}'. Expected a version like 'v1' or 'v1beta15'",
                s
            ))
        };

        let rest = s.strip_prefix('v').ok_or_else(invalid)?;
        let (major, beta) = match rest.split_once("beta") {
            Some((major, beta)) => (major, Some(beta)),
            None => (rest, None),
        };

        let major: u32 = major.parse().map_err(|_| invalid())?;
        let beta = match beta {
            Some(b) => Some(b.parse::<u32>().map_err(|_| invalid())?),
            None => None,
        };

        Ok(Self { major, beta })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.beta {
            Some(beta) => write!(f, "v{}beta{}", self.major, beta),
            None => write!(f, "v{}", self.major),
        }
    }
}
