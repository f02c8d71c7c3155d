//! Audit configuration support
//!
//! Loads per-site configuration from `pageaudit.toml`, `.pageauditrc.json`,
//! or `.pageaudit.yaml` files in a directory, or from an explicit path.
//!
//! # Configuration Format
//!
//! ```toml
//! # pageaudit.toml
//!
//! [phases.topical-relevance]
//! weight = 2.0
//! disabled_rules = ["entity-coverage"]
//!
//! [phases.page-experience]
//! enabled = false
//!
//! [rules.title-length]
//! severity = "low"  # Override default severity
//!
//! [scoring.penalties]
//! critical = 50.0
//! medium = 8.0
//!
//! [thresholds]
//! min_words = 800
//!
//! [defaults]
//! format = "markdown"
//! workers = 4
//! fail_under = 70
//! ```

use crate::error::{AuditError, AuditResult};
use crate::models::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::Thresholds;

/// File names searched in a directory, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "pageaudit.toml",
    ".pageauditrc.json",
    ".pageaudit.yaml",
    ".pageaudit.yml",
];

/// Audit configuration loaded from pageaudit.toml or similar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Per-phase overrides, keyed by phase id
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseConfigOverride>,

    /// Per-rule overrides, keyed by rule id
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfigOverride>,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Configuration override for one phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseConfigOverride {
    /// Whether the phase runs (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Contribution to the overall score; must be positive
    #[serde(default)]
    pub weight: Option<f64>,

    /// Rule ids to skip within this phase
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

/// Configuration override for one rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfigOverride {
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the severity of every finding the rule emits
    #[serde(default)]
    pub severity: Option<String>,
}

/// Scoring configuration for phase scores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub penalties: SeverityPenalties,
}

/// Points deducted from a phase's 100 for each finding, by severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPenalties {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub info: f64,
    pub internal_error: f64,
}

impl Default for SeverityPenalties {
    fn default() -> Self {
        Self {
            critical: 40.0,
            high: 20.0,
            medium: 10.0,
            low: 5.0,
            info: 0.0,
            internal_error: 25.0,
        }
    }
}

impl SeverityPenalties {
    pub fn penalty(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
            Severity::InternalError => self.internal_error,
        }
    }

    /// Reject negative or non-finite penalties
    pub fn validate(&self) -> AuditResult<()> {
        for severity in Severity::ALL {
            let value = self.penalty(severity);
            if !value.is_finite() || value < 0.0 {
                return Err(AuditError::ScoringConfiguration(format!(
                    "penalty for {} findings must be a non-negative number, got {}",
                    severity, value
                )));
            }
        }
        Ok(())
    }
}

/// Default CLI flags that can be set in config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliDefaults {
    /// Default output format (text, json, markdown)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of worker threads
    #[serde(default)]
    pub workers: Option<usize>,

    /// Exit non-zero when the overall score is below this
    #[serde(default)]
    pub fail_under: Option<u32>,
}

impl CliDefaults {
    /// Fill unset fields from `other`
    pub fn or(self, other: &CliDefaults) -> CliDefaults {
        CliDefaults {
            format: self.format.or_else(|| other.format.clone()),
            workers: self.workers.or(other.workers),
            fail_under: self.fail_under.or(other.fail_under),
        }
    }
}

/// Load audit configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `pageaudit.toml`
/// 2. `.pageauditrc.json`
/// 3. `.pageaudit.yaml` / `.pageaudit.yml`
///
/// Returns default configuration if no config file is found or loads.
pub fn load_audit_config(dir: &Path) -> AuditConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded audit config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No audit config found, using defaults");
    AuditConfig::default()
}

/// Load configuration from an explicit file, choosing the parser by extension
pub fn load_config_file(path: &Path) -> anyhow::Result<AuditConfig> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        "yaml" | "yml" => load_yaml_config(path, &content),
        _ => Ok(toml::from_str(&content)?),
    }
}

fn load_yaml_config(path: &Path, content: &str) -> anyhow::Result<AuditConfig> {
    // YAML is a superset of JSON, so pure-JSON YAML files work
    if let Ok(config) = serde_json::from_str::<AuditConfig>(content) {
        return Ok(config);
    }
    anyhow::bail!(
        "YAML config files with non-JSON syntax are not supported.\n\
         Please convert {} to TOML format (pageaudit.toml) or use JSON syntax.",
        path.display()
    )
}

impl AuditConfig {
    fn phase_override(&self, phase: &str) -> Option<&PhaseConfigOverride> {
        self.phases
            .get(phase)
            .or_else(|| {
                self.phases
                    .iter()
                    .find(|(k, _)| normalize_id(k) == phase)
                    .map(|(_, v)| v)
            })
    }

    fn rule_override(&self, rule: &str) -> Option<&RuleConfigOverride> {
        self.rules.get(rule).or_else(|| {
            self.rules
                .iter()
                .find(|(k, _)| normalize_id(k) == rule)
                .map(|(_, v)| v)
        })
    }

    /// Check if a phase is enabled (defaults to true if not specified)
    pub fn is_phase_enabled(&self, phase: &str) -> bool {
        self.phase_override(phase)
            .and_then(|p| p.enabled)
            .unwrap_or(true)
    }

    /// Configured weight for a phase, if overridden
    pub fn phase_weight(&self, phase: &str) -> Option<f64> {
        self.phase_override(phase).and_then(|p| p.weight)
    }

    /// Check if a rule runs, via `[rules.<id>] enabled` or the phase's
    /// `disabled_rules` list
    pub fn is_rule_enabled(&self, phase: &str, rule: &str) -> bool {
        if self.rule_override(rule).and_then(|r| r.enabled) == Some(false) {
            return false;
        }
        self.phase_override(phase).map_or(true, |p| {
            !p.disabled_rules.iter().any(|r| normalize_id(r) == rule)
        })
    }

    /// Severity override for a rule. Unparsable values are ignored with a warning.
    pub fn severity_override(&self, rule: &str) -> Option<Severity> {
        let raw = self.rule_override(rule)?.severity.as_deref()?;
        match raw.parse::<Severity>() {
            Ok(Severity::InternalError) => {
                warn!("Rule '{}': internal-error is not an assignable severity", rule);
                None
            }
            Ok(severity) => Some(severity),
            Err(e) => {
                warn!("Rule '{}': {}", rule, e);
                None
            }
        }
    }
}

/// Normalize an id for config lookup: `Title_Length` -> `title-length`
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase().replace(['_', ' '], "-")
}

#[cfg(test)]
mod tests;
