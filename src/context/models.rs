//! Context configuration data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level context configuration
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ContextConfig {
    /// Name of the currently active context
    #[serde(rename = "current-context", skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,
    /// Map of context name to context configuration
    #[serde(default)]
    pub contexts: BTreeMap<String, Context>,
}

/// A named context with default request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Project requests are issued against
    pub project: String,
    /// Zone used when no scope flag is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Region used when no scope flag is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    /// API version, e.g. "v1beta15"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
    /// API token (stored in config file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
