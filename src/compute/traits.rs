//! Ports between the command framework and the outside world
//!
//! The framework never talks HTTP or reads stdin directly. Collections,
//! scope catalogs, prompts and status sources are injected through these
//! traits, so every component can be driven by in-memory fakes in tests.

use futures::future::BoxFuture;
use serde_json::Value;

use super::models::{AggregatedPage, ScopedList};
use super::scope::Scope;
use crate::error::Result;

/// Parameters of one list page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation token from the previous page
    pub token: Option<String>,
    /// Server-side filter expression
    pub filter: Option<String>,
    pub max_results: Option<u32>,
}

impl PageRequest {
    /// Same request, continued at `token`
    pub fn continued(&self, token: Option<String>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }
}

/// The verbs of one resource collection
pub trait CollectionApi: Send + Sync {
    /// Name of the collection, e.g. "disks"
    fn name(&self) -> &str;

    fn get<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Value>>;

    fn insert<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        body: Value,
    ) -> BoxFuture<'a, Result<Value>>;

    fn delete<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Value>>;

    /// One page of a single scope
    fn list<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        page: PageRequest,
    ) -> BoxFuture<'a, Result<ScopedList>>;

    /// One page of the aggregated (all scopes) list call
    fn aggregated_list<'a>(
        &'a self,
        project: &'a str,
        page: PageRequest,
    ) -> BoxFuture<'a, Result<AggregatedPage>>;
}

/// Enumerates zones and regions of a project
pub trait ScopeCatalog: Send + Sync {
    fn list_zones<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;

    fn list_regions<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;
}

/// Asks the user to pick one item out of several
pub trait ChoicePrompt: Send + Sync {
    /// Returns the index of the chosen item in `choices`
    fn choose(&self, label: &str, choices: &[String]) -> Result<usize>;
}

/// Re-reads the current state of something being polled
pub trait StatusSource: Send + Sync {
    fn refresh<'a>(&'a self, current: &'a Value) -> BoxFuture<'a, Result<Value>>;
}

/// Responses split into pages by a continuation token
pub trait Paginated {
    fn next_page_token(&self) -> Option<&str>;
}

/// Common accessors for API resources kept as raw JSON
pub trait ComputeResource {
    fn name(&self) -> Option<&str>;

    fn self_link(&self) -> Option<&str>;

    fn kind(&self) -> Option<&str>;

    /// Check if the resource matches by name or by link
    fn matches(&self, input: &str) -> bool {
        self.name() == Some(input) || self.self_link() == Some(input)
    }
}

impl ComputeResource for Value {
    fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    fn self_link(&self) -> Option<&str> {
        self.get("selfLink").and_then(Value::as_str)
    }

    fn kind(&self) -> Option<&str> {
        self.get("kind").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_accessors() {
        let disk = json!({
            "kind": "compute#disk",
            "name": "d1",
            "selfLink": "https://h/projects/p/zones/z/disks/d1"
        });
        assert_eq!(disk.name(), Some("d1"));
        assert_eq!(disk.kind(), Some("compute#disk"));
        assert!(disk.matches("d1"));
        assert!(disk.matches("https://h/projects/p/zones/z/disks/d1"));
        assert!(!disk.matches("d2"));
    }

    #[test]
    fn test_resource_accessors_missing_fields() {
        let value = json!({"name": 42});
        assert_eq!(value.name(), None);
        assert_eq!(value.self_link(), None);
        assert!(!value.matches("42"));
    }

    #[test]
    fn test_page_request_continued_keeps_filter() {
        let page = PageRequest {
            token: None,
            filter: Some("name eq d1".to_string()),
            max_results: Some(5),
        };
        let next = page.continued(Some("t2".to_string()));
        assert_eq!(next.token.as_deref(), Some("t2"));
        assert_eq!(next.filter, page.filter);
        assert_eq!(next.max_results, Some(5));
    }
}
