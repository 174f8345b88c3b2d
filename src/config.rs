use std::time::Duration;

use crate::compute::ApiVersion;

/// Configuration constants for the compute API
pub mod api {
    /// Default API host (the version is appended per request)
    pub const DEFAULT_HOST: &str = "https://www.googleapis.com/compute";

    /// Default API version
    pub const DEFAULT_VERSION: &str = "v1beta15";

    /// Default page size for list requests
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Maximum concurrent requests for batches and list fan-out
    pub const MAX_CONCURRENT_REQUESTS: usize = 10;

    /// Literal scope value accepted as a deprecated alias for global scope
    pub const GLOBAL_SCOPE_NAME: &str = "global";
}

/// Defaults for command-line flags
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Seconds between operation polls
    pub const SLEEP_BETWEEN_POLLS: u64 = 3;

    /// Seconds to wait for an operation before giving up
    pub const MAX_WAIT_TIME: u64 = 240;

    /// Per-request HTTP timeout in seconds
    pub const REQUEST_TIMEOUT: u64 = 30;

    /// Environment variable holding the bearer token
    pub const TOKEN_ENV_VAR: &str = "COMPUTE_TOKEN";

    /// Environment variable holding the default project
    pub const PROJECT_ENV_VAR: &str = "COMPUTE_PROJECT";
}

/// Image listing configuration
pub mod images {
    /// Projects that publish well-known images
    pub const STANDARD_IMAGE_PROJECTS: &[&str] = &["centos-cloud", "debian-cloud", "google"];
}

/// Named context configuration
pub mod context {
    /// Directory name under the user's home
    pub const DIR_NAME: &str = ".computectl";

    /// Config file name
    pub const FILE_NAME: &str = "config.json";

    /// Environment variable overriding the active context
    pub const ENV_VAR: &str = "COMPUTECTL_CONTEXT";
}

/// Per-invocation settings passed explicitly through the framework
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project every request is issued against
    pub project: String,
    /// API host, without version
    pub api_host: String,
    /// Active API version
    pub version: ApiVersion,
    /// Wait for operations to finish before returning
    pub synchronous: bool,
    /// Disable interactive prompts
    pub batch: bool,
    /// Delay between two polls of an operation
    pub poll_interval: Duration,
    /// Poll budget for one operation
    pub max_wait: Duration,
    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,
    /// Worker pool size for batches and list fan-out
    pub max_concurrency: usize,
    /// Zone used when no scope flag is given
    pub default_zone: Option<String>,
    /// Region used when no scope flag is given
    pub default_region: Option<String>,
}

impl Settings {
    /// Settings for `project` with every other value at its default
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            api_host: api::DEFAULT_HOST.to_string(),
            version: ApiVersion::default(),
            synchronous: false,
            batch: false,
            poll_interval: Duration::from_secs(defaults::SLEEP_BETWEEN_POLLS),
            max_wait: Duration::from_secs(defaults::MAX_WAIT_TIME),
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT),
            max_concurrency: api::MAX_CONCURRENT_REQUESTS,
            default_zone: None,
            default_region: None,
        }
    }

    /// Base URL including the version, e.g. `https://host/compute/v1beta15`
    pub fn versioned_base(&self) -> String {
        format!("{}/{}", self.api_host.trim_end_matches('/'), self.version)
    }
}
