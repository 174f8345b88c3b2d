//! Common CLI types shared across commands

use clap::{Args, ValueEnum};

use crate::compute::ScopeFlags;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// YAML format
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Scope flags accepted by every resource command
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Zone of the resource ("global" is a deprecated alias of --global)
    #[arg(long)]
    pub zone: Option<String>,

    /// Region of the resource
    #[arg(long)]
    pub region: Option<String>,

    /// Use the global scope
    #[arg(long, default_value_t = false)]
    pub global: bool,
}

impl ScopeArgs {
    pub fn to_flags(&self) -> ScopeFlags {
        ScopeFlags {
            zone: self.zone.clone(),
            region: self.region.clone(),
            global: self.global,
        }
    }
}
