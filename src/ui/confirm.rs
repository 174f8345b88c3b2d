//! Confirmation prompt before destructive commands

use dialoguer::Confirm;
use log::warn;

use crate::error::{ComputeError, Result};

/// Summary line for the resources about to be deleted
fn delete_summary(collection: &str, names: &[String]) -> String {
    match names {
        [single] => format!("Delete {} '{}'?", collection, single),
        _ => format!(
            "Delete {} {}: {}?",
            names.len(),
            collection,
            names.join(", ")
        ),
    }
}

/// Ask before deleting `names`
///
/// `assume_yes` skips the prompt. In batch mode nobody can answer, so the
/// deletion is declined.
pub fn confirm_delete(
    collection: &str,
    names: &[String],
    assume_yes: bool,
    batch: bool,
) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if batch {
        warn!("Refusing to delete without confirmation in batch mode; pass -y to proceed");
        return Ok(false);
    }

    Confirm::new()
        .with_prompt(delete_summary(collection, names))
        .default(false)
        .interact()
        .map_err(|e| ComputeError::Prompt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_summary_single() {
        assert_eq!(
            delete_summary("disks", &["d1".to_string()]),
            "Delete disks 'd1'?"
        );
    }

    #[test]
    fn test_delete_summary_many() {
        let names = vec!["d1".to_string(), "d2".to_string()];
        assert_eq!(delete_summary("disks", &names), "Delete 2 disks: d1, d2?");
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(confirm_delete("disks", &["d1".to_string()], true, true).unwrap());
    }

    #[test]
    fn test_batch_mode_declines() {
        assert!(!confirm_delete("disks", &["d1".to_string()], false, true).unwrap());
    }
}
