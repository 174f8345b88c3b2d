//! Serialization of command results

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{ComputeError, Result};

/// Render `value` in the requested format
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => serde_yml::to_string(value)
            .map_err(|e| ComputeError::Json(format!("Failed to render YAML: {}", e))),
    }
}

/// Print `value` to stdout in the requested format
pub fn output_raw<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = render(value, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
