//! User-level configuration for pageaudit
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/pageaudit/config.toml

use super::CliDefaults;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub defaults: CliDefaults,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Disable ANSI colors in text output
    pub no_color: Option<bool>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/pageaudit/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        // Environment variables override everything
        if let Ok(format) = std::env::var("PAGEAUDIT_FORMAT") {
            config.defaults.format = Some(format);
        }
        if std::env::var_os("NO_COLOR").is_some() {
            config.display.no_color = Some(true);
        }

        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pageaudit").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        self.defaults = other.defaults.or(&self.defaults);
        if other.display.no_color.is_some() {
            self.display.no_color = other.display.no_color;
        }
    }

    /// Whether text output should be colored
    pub fn use_color(&self) -> bool {
        !self.display.no_color.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(config.use_color());
        assert_eq!(config.defaults, CliDefaults::default());
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[defaults]
format = "markdown"
workers = 2

[display]
no_color = true
"#;
        let config: UserConfig = toml::from_str(toml_str).expect("parse user config");
        assert_eq!(config.defaults.format.as_deref(), Some("markdown"));
        assert_eq!(config.defaults.workers, Some(2));
        assert!(!config.use_color());
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").expect("parse empty config");
        assert!(config.use_color());
        assert!(config.defaults.format.is_none());
    }

    #[test]
    fn test_invalid_toml_does_not_crash() {
        let bad_toml = "this is [[ not valid toml {{{}}}";
        assert!(toml::from_str::<UserConfig>(bad_toml).is_err());
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut base = UserConfig {
            defaults: CliDefaults {
                format: Some("text".into()),
                workers: Some(8),
                fail_under: None,
            },
            display: DisplayConfig::default(),
        };
        let other = UserConfig {
            defaults: CliDefaults {
                format: Some("json".into()),
                workers: None,
                fail_under: Some(75),
            },
            display: DisplayConfig { no_color: Some(true) },
        };
        base.merge(other);
        assert_eq!(base.defaults.format.as_deref(), Some("json"));
        assert_eq!(base.defaults.workers, Some(8));
        assert_eq!(base.defaults.fail_under, Some(75));
        assert!(!base.use_color());
    }

    #[test]
    fn test_user_config_path() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("pageaudit/config.toml"));
        }
    }
}
