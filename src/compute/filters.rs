//! Result filters and operation error helpers

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use super::locator::denormalize;
use super::models::is_operation;
use super::traits::ComputeResource;

/// Suffix marking a dated image: `<family>-vYYYYMMDD`
const VERSION_MARKER: &str = "-v";

/// Split an image name into its family and release date
fn image_version(name: &str) -> Option<(&str, NaiveDate)> {
    let at = name.rfind(VERSION_MARKER)?;
    let (family, suffix) = name.split_at(at);
    let digits = &suffix[VERSION_MARKER.len()..];
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(digits, "%Y%m%d").ok()?;
    Some((family, date))
}

fn image_name(image: &Value) -> String {
    match image.name() {
        Some(name) => name.to_string(),
        None => denormalize(image.self_link().unwrap_or_default()),
    }
}

/// Keep only the newest dated image of each family
///
/// Images without a date suffix are always kept. Survivors stay in their
/// original positions.
pub fn newest_images(images: Vec<Value>) -> Vec<Value> {
    let names: Vec<String> = images.iter().map(image_name).collect();

    let mut newest: HashMap<&str, (NaiveDate, usize)> = HashMap::new();
    for (index, name) in names.iter().enumerate() {
        if let Some((family, date)) = image_version(name) {
            let entry = newest.entry(family).or_insert((date, index));
            if date > entry.0 {
                *entry = (date, index);
            }
        }
    }

    images
        .into_iter()
        .enumerate()
        .filter(|(index, _)| match image_version(&names[*index]) {
            Some((family, _)) => newest.get(family).is_some_and(|(_, keep)| keep == index),
            None => true,
        })
        .map(|(_, image)| image)
        .collect()
}

/// Server-side errors of an operation as `"CODE: message"` strings
pub fn operation_errors(operation: &Value) -> Vec<String> {
    operation
        .pointer("/error/errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    let code = e.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
                    let message = e.get("message").and_then(Value::as_str).unwrap_or("");
                    format!("{}: {}", code, message)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Whether any result is an operation that finished with errors
pub fn errors_in_results(results: &[Value]) -> bool {
    results
        .iter()
        .any(|r| is_operation(r) && !operation_errors(r).is_empty())
}
