use crate::error::{ConfigError, CoreError};
use serde::Deserialize;
use std::path::Path;

/// Application configuration.
///
/// Loaded from an optional TOML file, then overridden by environment
/// variables. Defaults work out of the box against a local SQLite file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite connection string for the tracked-handle registry.
    pub database_url: String,
    /// Length of the "recent" window for growth trends, in days.
    pub trend_window_days: i64,
    /// Field delimiter for the export table.
    pub export_delimiter: char,
    /// Handles seeded into the registry on first run.
    pub restaurants: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://platewatch.db".to_string(),
            trend_window_days: 14,
            export_delimiter: ',',
            restaurants: vec![
                "@soulspoon".to_string(),
                "@islandgrillhouse".to_string(),
                "@mamaskitchenatl".to_string(),
                "@thegumbostop".to_string(),
                "@goldencrustcafe".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw).map_err(ConfigError::Parse)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        if let Ok(url) = std::env::var("PLATEWATCH_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(days) = std::env::var("PLATEWATCH_TREND_WINDOW_DAYS") {
            self.trend_window_days =
                days.parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "trend_window_days".to_string(),
                        value: days.clone(),
                    })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.trend_window_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "trend_window_days".to_string(),
                value: self.trend_window_days.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trend_window_days, 14);
        assert!(!config.restaurants.is_empty());
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig =
            toml::from_str("trend_window_days = 7\n").expect("partial config should parse");
        assert_eq!(config.trend_window_days, 7);
        // Unspecified fields fall back to defaults
        assert_eq!(config.export_delimiter, ',');
    }

    #[test]
    fn rejects_non_positive_window() {
        let config: AppConfig =
            toml::from_str("trend_window_days = 0\n").expect("toml should parse");
        assert!(config.validate().is_err());
    }
}
