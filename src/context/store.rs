//! Context configuration file I/O

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::context as context_config;
use crate::error::{ComputeError, Result};

use super::models::ContextConfig;

/// Reads and writes `~/.computectl/config.json`
pub struct ContextStore {
    config_path: PathBuf,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

fn config_error(action: &str, path: &Path, err: impl Display) -> ComputeError {
    ComputeError::Config(format!("Failed to {} {}: {}", action, path.display(), err))
}

impl ContextStore {
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Store backed by a custom file (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(context_config::DIR_NAME)
            .join(context_config::FILE_NAME)
    }

    /// Load the configuration; a missing file is an empty configuration
    pub fn load(&self) -> Result<ContextConfig> {
        let path = &self.config_path;
        if !path.exists() {
            return Ok(ContextConfig::default());
        }

        let content =
            fs::read_to_string(path).map_err(|e| config_error("read context config", path, e))?;
        serde_json::from_str(&content).map_err(|e| config_error("parse context config", path, e))
    }

    /// Write the configuration through a temporary file and a rename
    ///
    /// The file is readable by its owner only since contexts may hold tokens.
    pub fn save(&self, config: &ContextConfig) -> Result<()> {
        let path = &self.config_path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| config_error("create config directory", parent, e))?;
        }

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| ComputeError::Config(format!("Failed to serialize contexts: {}", e)))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| config_error("write", &tmp_path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| config_error("restrict permissions of", &tmp_path, e))?;
        }

        fs::rename(&tmp_path, path).map_err(|e| config_error("replace", path, e))
    }
}
