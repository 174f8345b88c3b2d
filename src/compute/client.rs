//! HTTP client for the compute API

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use super::collection::{Collection, REGIONS, ZONES};
use super::lister::fetch_all_pages;
use super::locator::{denormalize, extract_project, extract_scope, ResourceLocator};
use super::models::{AggregatedPage, ScopedList};
use super::scope::Scope;
use super::traits::{
    CollectionApi, ComputeResource, PageRequest, ScopeCatalog, StatusSource,
};
use super::version::ApiVersion;
use crate::config::{api, Settings};
use crate::error::{ComputeError, Result};

/// Compute API client
pub struct ComputeClient {
    client: Client,
    token: String,
    project: String,
    locator: ResourceLocator,
}

impl ComputeClient {
    /// Create a new client with connection pooling and a per-request timeout
    pub fn new(token: String, settings: &Settings) -> Self {
        let client = Client::builder()
            // Connection pool settings - reuse connections
            .pool_max_idle_per_host(api::MAX_CONCURRENT_REQUESTS)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            // Timeouts
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            project: settings.project.clone(),
            locator: ResourceLocator::new(settings),
        }
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn version(&self) -> ApiVersion {
        self.locator.version()
    }

    /// Verbs of one collection
    pub fn collection<'a>(&'a self, collection: &'a Collection) -> RestCollection<'a> {
        RestCollection {
            client: self,
            collection,
        }
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
    }

    pub(crate) async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let response = self.with_headers(self.client.get(url)).send().await?;
        Self::parse_api_response(response, "fetch", url).await
    }

    pub(crate) async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!("POST {}", url);
        let response = self
            .with_headers(self.client.post(url))
            .json(body)
            .send()
            .await?;
        Self::parse_api_response(response, "create", url).await
    }

    pub(crate) async fn delete_json(&self, url: &str) -> Result<Value> {
        debug!("DELETE {}", url);
        let response = self.with_headers(self.client.delete(url)).send().await?;
        Self::parse_api_response(response, "delete", url).await
    }

    /// Parse an API response, returning error for non-success status codes
    ///
    /// The server's `error.message` is used when the body carries one.
    async fn parse_api_response(
        response: reqwest::Response,
        action: &str,
        url: &str,
    ) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("Failed to {} {}", action, url));
            return Err(ComputeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Names of all resources of a top-level collection
    async fn list_names(&self, collection: &Collection, project: &str) -> Result<Vec<String>> {
        let rest = self.collection(collection);
        let page = PageRequest::default();
        let pages = fetch_all_pages(|token| rest.list(project, &Scope::Global, page.continued(token)))
            .await?;

        Ok(pages
            .into_iter()
            .flat_map(|p| p.items)
            .filter_map(|item| item.name().map(String::from))
            .collect())
    }
}

/// Append list query parameters to a URL
fn with_query(url: String, page: &PageRequest) -> String {
    let mut params = Vec::new();
    if let Some(token) = &page.token {
        params.push(format!("pageToken={}", urlencoding::encode(token)));
    }
    if let Some(filter) = &page.filter {
        params.push(format!("filter={}", urlencoding::encode(filter)));
    }
    if let Some(max) = page.max_results {
        params.push(format!("maxResults={}", max));
    }

    if params.is_empty() {
        url
    } else {
        format!("{}?{}", url, params.join("&"))
    }
}

impl ScopeCatalog for ComputeClient {
    fn list_zones<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        self.list_names(&ZONES, project).boxed()
    }

    fn list_regions<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            if !self.version().has_regions() {
                debug!("Regions do not exist in {}", self.version());
                return Ok(Vec::new());
            }
            self.list_names(&REGIONS, project).await
        }
        .boxed()
    }
}

/// One collection addressed over HTTP
pub struct RestCollection<'a> {
    client: &'a ComputeClient,
    collection: &'a Collection,
}

impl RestCollection<'_> {
    /// Scope used in URLs; top-level collections have none
    fn url_scope<'s>(&self, scope: &'s Scope) -> Option<&'s Scope> {
        if self.collection.top_level {
            None
        } else {
            Some(scope)
        }
    }

    fn collection_url(&self, project: &str, scope: &Scope) -> String {
        self.client
            .locator
            .collection_url(project, self.url_scope(scope), self.collection.name)
    }

    fn resource_url(&self, project: &str, scope: &Scope, name: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(project, scope),
            urlencoding::encode(&denormalize(name))
        )
    }

    /// Request body with the zone set, for versions that take it there
    fn insert_body(&self, project: &str, scope: &Scope, mut body: Value) -> Value {
        if let (Scope::Zone(zone), Value::Object(map)) = (scope, &mut body) {
            if self.client.version().zone_in_body() && !self.collection.top_level {
                let zone_url = self.client.locator.normalize_top_level(project, "zones", zone);
                map.insert("zone".to_string(), Value::String(zone_url));
            }
        }
        body
    }
}

impl CollectionApi for RestCollection<'_> {
    fn name(&self) -> &str {
        self.collection.name
    }

    fn get<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            let url = self.resource_url(project, scope, name);
            self.client.get_json(&url).await
        }
        .boxed()
    }

    fn insert<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        body: Value,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            let url = self.collection_url(project, scope);
            let body = self.insert_body(project, scope, body);
            self.client.post_json(&url, &body).await
        }
        .boxed()
    }

    fn delete<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            let url = self.resource_url(project, scope, name);
            self.client.delete_json(&url).await
        }
        .boxed()
    }

    fn list<'a>(
        &'a self,
        project: &'a str,
        scope: &'a Scope,
        page: PageRequest,
    ) -> BoxFuture<'a, Result<ScopedList>> {
        async move {
            let url = with_query(self.collection_url(project, scope), &page);
            let body = self.client.get_json(&url).await?;
            ScopedList::from_response(body)
        }
        .boxed()
    }

    fn aggregated_list<'a>(
        &'a self,
        project: &'a str,
        page: PageRequest,
    ) -> BoxFuture<'a, Result<AggregatedPage>> {
        async move {
            if !self.collection.uses_aggregated_list(self.client.version()) {
                return Err(ComputeError::Command(format!(
                    "{} has no aggregated list in {}",
                    self.collection.name,
                    self.client.version()
                )));
            }
            let url = with_query(
                self.client.locator.aggregated_url(project, self.collection.name),
                &page,
            );
            let body = self.client.get_json(&url).await?;
            AggregatedPage::from_response(body, self.collection.name)
        }
        .boxed()
    }
}

impl StatusSource for RestCollection<'_> {
    /// Re-read a resource from its `selfLink` (project and scope) and name
    fn refresh<'a>(&'a self, current: &'a Value) -> BoxFuture<'a, Result<Value>> {
        async move {
            let name = current.name().ok_or_else(|| {
                ComputeError::Json(format!("Cannot poll {} without a name", self.collection.name))
            })?;
            let link = current.self_link().unwrap_or_default();
            let project = extract_project(link).unwrap_or_else(|| self.client.project.clone());
            let scope = extract_scope(link)
                .or_else(|| {
                    current
                        .get("zone")
                        .and_then(Value::as_str)
                        .map(|z| Scope::Zone(denormalize(z)))
                })
                .unwrap_or(Scope::Global);

            let url = self.resource_url(&project, &scope, name);
            self.client.get_json(&url).await
        }
        .boxed()
    }
}

#[cfg(test)]
impl ComputeClient {
    /// Create a test client against a mock server
    pub fn test_client(base_url: &str) -> Self {
        Self::test_client_with_version(base_url, api::DEFAULT_VERSION)
    }

    pub fn test_client_with_version(base_url: &str, version: &str) -> Self {
        let mut settings = Settings::new("p");
        settings.api_host = base_url.to_string();
        settings.version = version.parse().unwrap();
        Self::new("test-token".to_string(), &settings)
    }
}
