//! Rules command - list the phase registry

use crate::config::{load_config_file, AuditConfig};
use crate::phases::PhaseKind;
use crate::rules::RuleValidator;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub(super) fn run(phase: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AuditConfig::default(),
    };

    let kinds: Vec<PhaseKind> = match phase {
        Some(id) => {
            let kind = PhaseKind::from_id(id).with_context(|| {
                format!(
                    "Unknown phase '{}'. Valid phases: {}",
                    id,
                    PhaseKind::ALL.iter().map(|k| k.id()).collect::<Vec<_>>().join(", ")
                )
            })?;
            vec![kind]
        }
        None => PhaseKind::ALL.to_vec(),
    };

    print!("{}", render(&kinds, &config));
    Ok(())
}

fn render(kinds: &[PhaseKind], config: &AuditConfig) -> String {
    let mut out = String::new();
    for kind in kinds {
        let enabled = config.is_phase_enabled(kind.id());
        let weight = config.phase_weight(kind.id()).unwrap_or(kind.default_weight());
        out.push_str(&format!(
            "\n{} {}  weight {:.2}{}\n",
            style(kind.name()).bold(),
            style(format!("({})", kind.id())).dim(),
            weight,
            if enabled { "" } else { "  [disabled]" }
        ));
        for rule in kind.rules() {
            let marker = if config.is_rule_enabled(kind.id(), rule.id()) {
                style("✓").green()
            } else {
                style("-").dim()
            };
            out.push_str(&format!(
                "  {} {:<28} {}\n",
                marker,
                rule.id(),
                style(rule.description()).dim()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_rule() {
        console::set_colors_enabled(false);
        let out = render(&PhaseKind::ALL, &AuditConfig::default());
        for kind in PhaseKind::ALL {
            assert!(out.contains(kind.id()));
            for rule in kind.rules() {
                assert!(out.contains(rule.id()), "{} missing", rule.id());
            }
        }
    }

    #[test]
    fn test_render_marks_disabled() {
        console::set_colors_enabled(false);
        let config: AuditConfig = toml::from_str(
            "[phases.page-experience]\nenabled = false\nweight = 2.0",
        )
        .expect("parse config");
        let out = render(&[PhaseKind::PageExperience], &config);
        assert!(out.contains("weight 2.00"));
        assert!(out.contains("[disabled]"));
    }
}
