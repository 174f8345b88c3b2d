//! Context command handlers

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::cli::{ConfigAction, SetContextArgs};
use crate::compute::ApiVersion;
use crate::error::{ComputeError, Result};

use super::models::{Context, ContextConfig};
use super::store::ContextStore;

/// Dispatch `config` subcommands
pub fn run_context_command(action: &ConfigAction) -> Result<()> {
    let store = ContextStore::new();
    match action {
        ConfigAction::GetContexts => run_context_list(&store),
        ConfigAction::SetContext(args) => run_context_set(&store, args),
        ConfigAction::UseContext(args) => run_context_use(&store, &args.name),
        ConfigAction::DeleteContext(args) => run_context_delete(&store, &args.name),
        ConfigAction::CurrentContext => run_context_show(&store),
        ConfigAction::View => run_config_view(&store),
    }
}

fn not_found(name: &str, config: &ContextConfig) -> ComputeError {
    let available: Vec<&str> = config.contexts.keys().map(String::as_str).collect();
    ComputeError::Config(format!(
        "Context '{}' not found. Available contexts: {}",
        name,
        available.join(", ")
    ))
}

fn or_not_set(value: Option<&str>) -> &str {
    value.unwrap_or("<not set>")
}

fn run_context_list(store: &ContextStore) -> Result<()> {
    let config = store.load()?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("\nUse 'computectl config set-context <name> --project <project>' to create one.");
        return Ok(());
    }

    println!("{}", contexts_table(&config));
    Ok(())
}

/// Table of all contexts, current one marked, tokens masked
fn contexts_table(config: &ContextConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("CURRENT"),
            Cell::new("NAME"),
            Cell::new("PROJECT"),
            Cell::new("ZONE"),
            Cell::new("REGION"),
            Cell::new("TOKEN"),
        ]);

    for (name, ctx) in &config.contexts {
        let is_current = config.current_context.as_ref().is_some_and(|c| c == name);
        let current_marker = if is_current { "*" } else { "" };

        table.add_row(vec![
            Cell::new(current_marker),
            Cell::new(name),
            Cell::new(&ctx.project),
            Cell::new(or_not_set(ctx.zone.as_deref())),
            Cell::new(or_not_set(ctx.region.as_deref())),
            Cell::new(mask_token(ctx.token.as_deref())),
        ]);
    }

    table
}

fn run_context_show(store: &ContextStore) -> Result<()> {
    let config = store.load()?;

    let current_name = config.current_context.as_ref().ok_or_else(|| {
        ComputeError::Config(
            "No current context set. Use 'computectl config use-context <name>' to set one."
                .to_string(),
        )
    })?;
    let ctx = config
        .contexts
        .get(current_name)
        .ok_or_else(|| not_found(current_name, &config))?;

    println!("Current context: {}", current_name);
    println!("  Project: {}", ctx.project);
    println!("  Zone:    {}", or_not_set(ctx.zone.as_deref()));
    println!("  Region:  {}", or_not_set(ctx.region.as_deref()));
    println!("  Host:    {}", or_not_set(ctx.api_host.as_deref()));
    println!("  Version: {}", or_not_set(ctx.service_version.as_deref()));
    println!("  Token:   {}", mask_token(ctx.token.as_deref()));
    Ok(())
}

/// Create a context or merge the given fields into an existing one
fn run_context_set(store: &ContextStore, args: &SetContextArgs) -> Result<()> {
    if let Some(version) = &args.service_version {
        version.parse::<ApiVersion>()?;
    }

    let mut config = store.load()?;

    if let Some(existing) = config.contexts.get_mut(&args.name) {
        if let Some(project) = &args.project {
            existing.project = project.clone();
        }
        merge(&mut existing.zone, &args.zone);
        merge(&mut existing.region, &args.region);
        merge(&mut existing.api_host, &args.api_host);
        merge(&mut existing.service_version, &args.service_version);
        merge(&mut existing.token, &args.token);
        store.save(&config)?;
        println!("✓ Updated context '{}'", args.name);
        return Ok(());
    }

    let project = args.project.as_ref().ok_or_else(|| {
        ComputeError::Config(format!(
            "--project is required when creating a new context. Usage:\n  \
             computectl config set-context {} --project <PROJECT> [--zone <ZONE>] [--region <REGION>]",
            args.name
        ))
    })?;

    config.contexts.insert(
        args.name.clone(),
        Context {
            project: project.clone(),
            zone: args.zone.clone(),
            region: args.region.clone(),
            api_host: args.api_host.clone(),
            service_version: args.service_version.clone(),
            token: args.token.clone(),
        },
    );

    // the first context becomes current
    if config.contexts.len() == 1 {
        config.current_context = Some(args.name.clone());
    }

    store.save(&config)?;
    println!("✓ Created context '{}'", args.name);
    Ok(())
}

fn merge(field: &mut Option<String>, update: &Option<String>) {
    if update.is_some() {
        field.clone_from(update);
    }
}

fn run_context_use(store: &ContextStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    if !config.contexts.contains_key(name) {
        return Err(not_found(name, &config));
    }

    config.current_context = Some(name.to_string());
    store.save(&config)?;
    println!("✓ Switched to context '{}'", name);
    Ok(())
}

fn run_context_delete(store: &ContextStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    if config.contexts.remove(name).is_none() {
        return Err(not_found(name, &config));
    }

    if config.current_context.as_deref() == Some(name) {
        config.current_context = None;
    }

    store.save(&config)?;
    println!("✓ Deleted context '{}'", name);
    Ok(())
}

/// Print the configuration with tokens masked
fn run_config_view(store: &ContextStore) -> Result<()> {
    let mut config = store.load()?;
    for ctx in config.contexts.values_mut() {
        if ctx.token.is_some() {
            ctx.token = Some(mask_token(ctx.token.as_deref()));
        }
    }
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| ComputeError::Config(format!("Failed to serialize config: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Show the last 4 chars of a token, or "<not set>"
fn mask_token(token: Option<&str>) -> String {
    match token {
        Some(t) if t.len() >= 4 && t.is_char_boundary(t.len() - 4) => {
            format!("****{}", &t[t.len() - 4..])
        }
        Some(_) => "****".to_string(),
        None => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> ContextStore {
        ContextStore::with_path(dir.path().join("config.json"))
    }

    fn set_args(name: &str) -> SetContextArgs {
        SetContextArgs {
            name: name.to_string(),
            project: None,
            zone: None,
            region: None,
            api_host: None,
            service_version: None,
            token: None,
        }
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(Some("abcdefghijklmnop")), "****mnop");
        assert_eq!(mask_token(Some("abcd")), "****abcd");
        assert_eq!(mask_token(Some("ab")), "****");
        assert_eq!(mask_token(None), "<not set>");
    }

    #[test]
    fn test_contexts_table_marks_current_and_masks_tokens() {
        let mut config = ContextConfig::default();
        config.contexts.insert(
            "dev".to_string(),
            Context {
                project: "dev-project".to_string(),
                zone: Some("us-east-a".to_string()),
                token: Some("secret-token-9876".to_string()),
                ..Default::default()
            },
        );
        config.contexts.insert(
            "prod".to_string(),
            Context {
                project: "prod-project".to_string(),
                ..Default::default()
            },
        );
        config.current_context = Some("dev".to_string());

        let rendered = contexts_table(&config).to_string();
        assert!(rendered.contains("PROJECT"));
        assert!(rendered.contains("dev-project"));
        assert!(rendered.contains("prod-project"));
        assert!(rendered.contains("us-east-a"));
        assert!(rendered.contains("****9876"));
        assert!(!rendered.contains("secret-token"));
        let dev_row = rendered.lines().find(|l| l.contains("dev-project")).unwrap();
        let prod_row = rendered.lines().find(|l| l.contains("prod-project")).unwrap();
        // current marker plus the masked token
        assert_eq!(dev_row.matches('*').count(), 5);
        assert!(!prod_row.contains('*'));
    }

    #[test]
    fn test_context_set_new_requires_project() {
        let dir = TempDir::new().unwrap();
        let err = run_context_set(&test_store(&dir), &set_args("test")).unwrap_err();
        assert!(err.to_string().contains("--project is required"));
    }

    #[test]
    fn test_context_set_rejects_bad_version() {
        let dir = TempDir::new().unwrap();
        let args = SetContextArgs {
            project: Some("p".to_string()),
            service_version: Some("beta".to_string()),
            ..set_args("test")
        };
        let err = run_context_set(&test_store(&dir), &args).unwrap_err();
        assert!(err.to_string().contains("Invalid API version"));
    }

    #[test]
    fn test_context_set_new_creates_and_becomes_current() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let args = SetContextArgs {
            project: Some("my-project".to_string()),
            zone: Some("us-east-a".to_string()),
            service_version: Some("v1beta14".to_string()),
            ..set_args("prod")
        };
        run_context_set(&store, &args).unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.contexts["prod"].project, "my-project");
        assert_eq!(config.contexts["prod"].zone.as_deref(), Some("us-east-a"));
        assert_eq!(
            config.contexts["prod"].service_version.as_deref(),
            Some("v1beta14")
        );
        assert_eq!(config.current_context, Some("prod".to_string()));
    }

    #[test]
    fn test_context_set_update_merges() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let create = SetContextArgs {
            project: Some("old-project".to_string()),
            zone: Some("z1".to_string()),
            token: Some("old-token".to_string()),
            ..set_args("prod")
        };
        run_context_set(&store, &create).unwrap();

        let update = SetContextArgs {
            zone: Some("z2".to_string()),
            ..set_args("prod")
        };
        run_context_set(&store, &update).unwrap();

        let ctx = &store.load().unwrap().contexts["prod"];
        assert_eq!(ctx.project, "old-project");
        assert_eq!(ctx.token.as_deref(), Some("old-token"));
        assert_eq!(ctx.zone.as_deref(), Some("z2"));
    }

    #[test]
    fn test_second_context_does_not_switch_current() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        for name in ["prod", "dev"] {
            let args = SetContextArgs {
                project: Some(name.to_string()),
                ..set_args(name)
            };
            run_context_set(&store, &args).unwrap();
        }
        assert_eq!(store.load().unwrap().current_context.as_deref(), Some("prod"));
    }

    #[test]
    fn test_context_use_sets_current() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        for name in ["prod", "dev"] {
            let args = SetContextArgs {
                project: Some(name.to_string()),
                ..set_args(name)
            };
            run_context_set(&store, &args).unwrap();
        }

        run_context_use(&store, "dev").unwrap();
        assert_eq!(store.load().unwrap().current_context.as_deref(), Some("dev"));
    }

    #[test]
    fn test_context_use_nonexistent_errors() {
        let dir = TempDir::new().unwrap();
        let err = run_context_use(&test_store(&dir), "nonexistent").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_context_delete_clears_current() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let args = SetContextArgs {
            project: Some("p".to_string()),
            ..set_args("prod")
        };
        run_context_set(&store, &args).unwrap();

        run_context_delete(&store, "prod").unwrap();

        let config = store.load().unwrap();
        assert!(config.contexts.is_empty());
        assert!(config.current_context.is_none());
    }

    #[test]
    fn test_context_delete_nonexistent_errors() {
        let dir = TempDir::new().unwrap();
        assert!(run_context_delete(&test_store(&dir), "nonexistent").is_err());
    }

    #[test]
    fn test_context_delete_preserves_current_if_different() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        for name in ["prod", "dev"] {
            let args = SetContextArgs {
                project: Some(name.to_string()),
                ..set_args(name)
            };
            run_context_set(&store, &args).unwrap();
        }

        run_context_delete(&store, "dev").unwrap();
        assert_eq!(store.load().unwrap().current_context.as_deref(), Some("prod"));
    }
}
