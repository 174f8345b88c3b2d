//! Resource reference normalization
//!
//! Users refer to resources by bare name, by `projects/...` path or by a
//! full URL. Requests always carry a canonical URL built for the active API
//! version:
//!
//! ```text
//! <host>/<version>/projects/<project>/[<scope>/]<collection>/<name>
//! ```

use log::debug;

use super::scope::Scope;
use super::version::ApiVersion;
use crate::config::Settings;
use crate::error::{ComputeError, Result};

/// Reduce a reference to its final path segment
///
/// Never fails: `"/projects/p/zones/z/disks/d1/"` gives `"d1"`, an empty
/// reference gives an empty string.
pub fn denormalize(reference: &str) -> String {
    reference
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Reduce a project reference to the project name
///
/// Accepts `p`, `/p/`, `projects/p` and `/projects/p/`.
pub fn denormalize_project(value: &str) -> Result<String> {
    let trimmed = value.trim_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();

    let name = match segments.as_slice() {
        [name] => *name,
        ["projects", name] => *name,
        _ => {
            return Err(ComputeError::Command(format!(
                "Invalid project '{}'. Expected a name or 'projects/<name>'",
                value
            )))
        }
    };

    if name.is_empty() {
        return Err(ComputeError::Command(
            "Project name must not be empty".to_string(),
        ));
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ComputeError::Command(format!(
            "Invalid project '{}'. Project names are lowercase",
            value
        )));
    }

    Ok(name.to_string())
}

/// Read the scope out of a resource URL or path
///
/// Looks for `projects/<p>/` followed by `global`, `zones/<z>` or
/// `regions/<r>`. Anything else gives `None`.
pub fn extract_scope(url: &str) -> Option<Scope> {
    let segments = path_segments(url);
    let at = project_index(&segments)?;

    match segments.get(at + 2).copied()? {
        "global" => Some(Scope::Global),
        "zones" => segments.get(at + 3).map(|z| Scope::Zone(z.to_string())),
        "regions" => segments.get(at + 3).map(|r| Scope::Region(r.to_string())),
        _ => None,
    }
}

/// Read the project out of a resource URL or path
pub fn extract_project(url: &str) -> Option<String> {
    let segments = path_segments(url);
    let at = project_index(&segments)?;
    segments.get(at + 1).map(|p| p.to_string())
}

fn path_segments(url: &str) -> Vec<&str> {
    url.split('/').filter(|s| !s.is_empty()).collect()
}

/// Index of the `projects` segment, when a project name follows it
fn project_index(segments: &[&str]) -> Option<usize> {
    let at = segments.iter().position(|s| *s == "projects")?;
    segments.get(at + 1)?;
    Some(at)
}

/// Builds canonical resource URLs for one host and API version
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    base: String,
    version: ApiVersion,
}

impl ResourceLocator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base: settings.versioned_base(),
            version: settings.version,
        }
    }

    /// Versioned base, e.g. `https://host/compute/v1beta15`
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Canonical URL of `reference` in `collection`
    ///
    /// A reference that already carries a `projects/<P>/...` path (including
    /// URLs built for another version) keeps that path; it is re-rooted under
    /// the active base. Otherwise the URL is built from `project`, `scope`
    /// and the last segment of the reference. `scope` is `None` for
    /// top-level collections; the scope segment is also left out for
    /// versions that predate scoped paths.
    pub fn normalize(
        &self,
        project: &str,
        scope: Option<&Scope>,
        collection: &str,
        reference: &str,
    ) -> String {
        let trimmed = reference.trim_matches('/');

        if let Some(path) = embedded_project_path(trimmed) {
            debug!("Reference '{}' carries its own project path", reference);
            return format!("{}/{}", self.base, path);
        }

        let name = denormalize(trimmed);
        format!("{}/{}", self.collection_url(project, scope, collection), name)
    }

    /// URL of a collection, without a resource name
    pub fn collection_url(&self, project: &str, scope: Option<&Scope>, collection: &str) -> String {
        match scope {
            Some(scope) if self.version.has_scoped_paths() => format!(
                "{}/projects/{}/{}/{}",
                self.base,
                project,
                scope.path_segment(),
                collection
            ),
            _ => format!("{}/projects/{}/{}", self.base, project, collection),
        }
    }

    /// URL of the aggregated list call for a collection
    pub fn aggregated_url(&self, project: &str, collection: &str) -> String {
        format!("{}/projects/{}/aggregated/{}", self.base, project, collection)
    }

    pub fn normalize_top_level(&self, project: &str, collection: &str, reference: &str) -> String {
        self.normalize(project, None, collection, reference)
    }

    pub fn normalize_global(&self, project: &str, collection: &str, reference: &str) -> String {
        self.normalize(project, Some(&Scope::Global), collection, reference)
    }

    pub fn normalize_per_zone(
        &self,
        project: &str,
        zone: &str,
        collection: &str,
        reference: &str,
    ) -> String {
        let scope = Scope::Zone(denormalize(zone));
        self.normalize(project, Some(&scope), collection, reference)
    }

    pub fn normalize_per_region(
        &self,
        project: &str,
        region: &str,
        collection: &str,
        reference: &str,
    ) -> String {
        let scope = Scope::Region(denormalize(region));
        self.normalize(project, Some(&scope), collection, reference)
    }
}

/// The `projects/...` tail of a reference, if it has one
fn embedded_project_path(reference: &str) -> Option<&str> {
    if reference.starts_with("projects/") {
        return Some(reference);
    }
    reference
        .find("/projects/")
        .map(|at| &reference[at + 1..])
        .filter(|path| path.len() > "projects/".len())
}
