//! Init command - write an example pageaudit.toml

use crate::config::CONFIG_FILE_NAMES;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# pageaudit configuration
# Phase and rule ids are listed by `pageaudit rules`.

[defaults]
# Output format (text, json, markdown)
format = "text"
# Worker threads for phase execution (0 = auto)
# workers = 4
# Exit 1 when the overall score is below this
# fail_under = 70

# Reweight or disable a phase
[phases.topical-relevance]
weight = 1.25
# disabled_rules = ["entity-coverage"]

# [phases.page-experience]
# enabled = false

# Override the severity of a rule's findings
# [rules.title-length]
# severity = "low"

# Points deducted per finding; must be non-negative
[scoring.penalties]
critical = 40.0
high = 20.0
medium = 10.0
low = 5.0
info = 0.0
internal_error = 25.0

[thresholds]
min_words = 300
title_max_chars = 60
description_max_chars = 160
min_internal_links = 3
"#;

/// Run the init command
pub(super) fn run(path: &Path, force: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!(
            "{} Already exists: {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!("\nNext steps:");
    println!("  {} List phases and rules", style("pageaudit rules").cyan());
    println!("  {} Audit a page", style("pageaudit audit page.json").cyan());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_audit_config;

    #[test]
    fn test_example_config_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        run(dir.path(), false).expect("init");
        let config = load_audit_config(dir.path());
        assert_eq!(config.defaults.format.as_deref(), Some("text"));
        assert_eq!(config.phase_weight("topical-relevance"), Some(1.25));
        assert!(config.scoring.penalties.validate().is_ok());
        assert_eq!(config.thresholds.min_words, 300);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pageaudit.toml");
        std::fs::write(&path, "# mine\n").expect("write");
        run(dir.path(), false).expect("init");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine\n");
        run(dir.path(), true).expect("init --force");
        assert!(std::fs::read_to_string(&path).expect("read").contains("[scoring.penalties]"));
    }
}
