//! Configuration module for pageaudit
//!
//! This module handles:
//! - Audit configuration (pageaudit.toml)
//! - Phase weights and rule overrides
//! - Scoring penalties and rule thresholds
//! - CLI defaults, including the user-level config file

mod audit_config;
mod thresholds;
mod user_config;

pub use audit_config::{
    load_audit_config, load_config_file, normalize_id, AuditConfig, CliDefaults,
    PhaseConfigOverride, RuleConfigOverride, ScoringConfig, SeverityPenalties,
    CONFIG_FILE_NAMES,
};
pub use thresholds::Thresholds;
pub use user_config::UserConfig;
