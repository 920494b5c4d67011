//! Configuration loading and validation

use adrole_engine::EngineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete tool configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub catalog: CatalogSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSection {
    /// JSON file with the categorized role-eligible group names
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self { path: default_catalog_path() }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_catalog_path() -> PathBuf { PathBuf::from("config/builtin_groups.json") }
fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .context("Invalid [engine] section")?;

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Log level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.engine.priority_category, "Original_Role_Groups");
        assert_eq!(config.catalog.path, PathBuf::from("config/builtin_groups.json"));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\npriority_category = \"Tier0\"\nparallel = true\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.engine.priority_category, "Tier0");
        assert!(config.engine.parallel);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.catalog.path, PathBuf::from("config/builtin_groups.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load("/nonexistent/adrole.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
        assert!(AppConfig::load_or_default(None).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.priority_category = String::new();
        assert!(config.validate().is_err());
    }
}
