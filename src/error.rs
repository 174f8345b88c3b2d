use std::fmt;

/// Error type for compute API commands
#[derive(Debug)]
pub enum ComputeError {
    /// Missing or conflicting command-line arguments
    Usage(String),
    /// Invalid input or a request the API version cannot express
    Command(String),
    /// HTTP request failed
    Http(reqwest::Error),
    /// API returned an error response
    Api { status: u16, message: String },
    /// JSON parsing error
    Json(String),
    /// Configuration error
    Config(String),
    /// Interactive prompt failed or was aborted
    Prompt(String),
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeError::Usage(msg) => write!(f, "Usage error: {}", msg),
            ComputeError::Command(msg) => write!(f, "{}", msg),
            ComputeError::Http(e) => write!(f, "HTTP request failed: {}", e),
            ComputeError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            ComputeError::Json(msg) => write!(f, "JSON error: {}", msg),
            ComputeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ComputeError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
        }
    }
}

impl std::error::Error for ComputeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComputeError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ComputeError {
    fn from(err: reqwest::Error) -> Self {
        ComputeError::Http(err)
    }
}

impl From<serde_json::Error> for ComputeError {
    fn from(err: serde_json::Error) -> Self {
        ComputeError::Json(err.to_string())
    }
}

impl From<std::io::Error> for ComputeError {
    fn from(err: std::io::Error) -> Self {
        ComputeError::Config(err.to_string())
    }
}

/// Result type alias for compute operations
pub type Result<T> = std::result::Result<T, ComputeError>;
