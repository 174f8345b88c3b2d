//! List pages, merged results and batch outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::scope::Scope;
use super::traits::Paginated;
use crate::error::ComputeError;

/// Warning code for an empty page, which carries no information
pub const NO_RESULTS_ON_PAGE: &str = "NO_RESULTS_ON_PAGE";

/// Warning code recorded for a scope whose list call failed
pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

/// Warning attached to a list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWarning {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ListWarning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Whether the warning is worth reporting
    pub fn is_significant(&self) -> bool {
        self.code != NO_RESULTS_ON_PAGE
    }
}

/// One page of items from a single scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopedList {
    pub items: Vec<Value>,
    pub next_page_token: Option<String>,
    pub warning: Option<ListWarning>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListResponse {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    warning: Option<ListWarning>,
}

impl ScopedList {
    /// Parse a list response body (`items`, `nextPageToken`, `warning`)
    pub fn from_response(body: Value) -> Result<Self, ComputeError> {
        let raw: RawListResponse = serde_json::from_value(body)?;
        Ok(Self {
            items: raw.items,
            next_page_token: raw.next_page_token.filter(|t| !t.is_empty()),
            warning: raw.warning,
        })
    }
}

impl Paginated for ScopedList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

/// One page of an aggregated list call, keyed by bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedPage {
    pub buckets: BTreeMap<String, ScopedList>,
    pub next_page_token: Option<String>,
}

impl AggregatedPage {
    /// Parse an aggregated response body
    ///
    /// Each entry of `items` is a bucket holding a `<collection>` array
    /// and an optional `warning`.
    pub fn from_response(body: Value, collection: &str) -> Result<Self, ComputeError> {
        let next_page_token = body
            .get("nextPageToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        let mut buckets = BTreeMap::new();
        if let Some(Value::Object(entries)) = body.get("items") {
            for (key, bucket) in entries {
                let items = match bucket.get(collection) {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                };
                let warning = match bucket.get("warning") {
                    Some(w) => Some(serde_json::from_value(w.clone())?),
                    None => None,
                };
                buckets.insert(
                    key.clone(),
                    ScopedList {
                        items,
                        next_page_token: None,
                        warning,
                    },
                );
            }
        }

        Ok(Self {
            buckets,
            next_page_token,
        })
    }
}

impl Paginated for AggregatedPage {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}

/// Items merged across scopes (and projects), plus per-scope warnings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub items: Vec<Value>,
    pub warnings: Vec<ScopeWarning>,
}

/// A warning reported for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeWarning {
    pub scope: String,
    pub code: String,
    pub message: String,
}

impl ScopeWarning {
    pub fn new(scope: &Scope, warning: ListWarning) -> Self {
        Self {
            scope: scope.path_segment(),
            code: warning.code,
            message: warning.message,
        }
    }
}

impl AggregatedResult {
    /// Append the items and warnings of another result
    pub fn extend(&mut self, other: AggregatedResult) {
        self.items.extend(other.items);
        self.warnings.extend(other.warnings);
    }
}

/// Results of a batch of independent requests
///
/// Successes keep submission order. Exceptions are in completion order and
/// are not correlated back to the request that raised them.
#[derive(Debug, Default)]
pub struct BatchOutcome<T> {
    pub results: Vec<T>,
    pub exceptions: Vec<ComputeError>,
}

impl<T> BatchOutcome<T> {
    pub fn has_errors(&self) -> bool {
        !self.exceptions.is_empty()
    }
}

/// Whether a value is an operation resource
pub fn is_operation(value: &Value) -> bool {
    value
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.ends_with("#operation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scoped_list_from_response() {
        let list = ScopedList::from_response(json!({
            "kind": "compute#diskList",
            "items": [{"name": "d1"}, {"name": "d2"}],
            "nextPageToken": "next"
        }))
        .unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.next_page_token.as_deref(), Some("next"));
        assert!(list.warning.is_none());
    }

    #[test]
    fn test_scoped_list_warning_only_page() {
        let list = ScopedList::from_response(json!({
            "warning": {"code": "NO_RESULTS_ON_PAGE", "message": "empty"}
        }))
        .unwrap();
        assert!(list.items.is_empty());
        assert!(list.next_page_token.is_none());
        assert!(!list.warning.unwrap().is_significant());
    }

    #[test]
    fn test_empty_page_token_is_none() {
        let list = ScopedList::from_response(json!({"nextPageToken": ""})).unwrap();
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_aggregated_page_from_response() {
        let page = AggregatedPage::from_response(
            json!({
                "items": {
                    "zones/a": {"instances": [{"name": "i1"}]},
                    "zones/c": {"warning": {"code": "UNREACHABLE", "message": "down"}},
                    "global": {"warning": {"code": "NO_RESULTS_ON_PAGE", "message": ""}}
                },
                "nextPageToken": "p2"
            }),
            "instances",
        )
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
        assert_eq!(page.buckets.len(), 3);
        assert_eq!(page.buckets["zones/a"].items.len(), 1);
        assert_eq!(
            page.buckets["zones/c"].warning.as_ref().unwrap().code,
            "UNREACHABLE"
        );
    }

    #[test]
    fn test_aggregated_page_without_items() {
        let page = AggregatedPage::from_response(json!({}), "disks").unwrap();
        assert!(page.buckets.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_is_operation() {
        assert!(is_operation(&json!({"kind": "compute#operation"})));
        assert!(!is_operation(&json!({"kind": "compute#disk"})));
        assert!(!is_operation(&json!({"name": "x"})));
    }

    #[test]
    fn test_batch_outcome_has_errors() {
        let mut outcome: BatchOutcome<Value> = BatchOutcome::default();
        assert!(!outcome.has_errors());
        outcome
            .exceptions
            .push(ComputeError::Command("boom".to_string()));
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_scope_warning_uses_path_segment() {
        let warning = ScopeWarning::new(
            &Scope::Zone("c".to_string()),
            ListWarning::new("UNREACHABLE", "down"),
        );
        assert_eq!(warning.scope, "zones/c");
        assert_eq!(warning.code, "UNREACHABLE");
    }
}
