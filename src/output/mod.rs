//! Output formatting module
//!
//! Results go to stdout as JSON or YAML. Scope warnings, request failures
//! and operation errors go to stderr so that stdout stays parseable.

mod common;

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::compute::{operation_errors, AggregatedResult, BatchOutcome, ComputeResource};
use crate::error::Result;

pub use common::{output_raw, render};

/// Print the items of a list and report its scope warnings
pub fn output_list(result: &AggregatedResult, format: OutputFormat) -> Result<()> {
    for warning in &result.warnings {
        eprintln!(
            "Warning: {}: {}: {}",
            warning.scope, warning.code, warning.message
        );
    }
    output_raw(&result.items, format)
}

/// Print the results of a batch and report its failures
///
/// A batch of one prints the bare object, otherwise an array.
pub fn output_batch(outcome: &BatchOutcome<Value>, format: OutputFormat) -> Result<()> {
    for error in &outcome.exceptions {
        eprintln!("Error: {}", error);
    }
    for result in &outcome.results {
        for message in operation_errors(result) {
            eprintln!(
                "Error in operation {}: {}",
                result.name().unwrap_or("<unnamed>"),
                message
            );
        }
    }

    match outcome.results.as_slice() {
        [] => Ok(()),
        [single] => output_raw(single, format),
        all => output_raw(all, format),
    }
}
