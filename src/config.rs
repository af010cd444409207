//! Configuration Management
//!
//! Handles persistent configuration storage for bqctl.

use crate::gcp::client::DEFAULT_ENDPOINT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the API endpoint
pub const ENDPOINT_ENV: &str = "BIGQUERY_ENDPOINT";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default project for bare dataset ids
    #[serde(default)]
    pub project_id: Option<String>,
    /// API base URL, for emulators or proxies
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Page size hint for listings
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bqctl").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config at {:?}: {:#}", path, e);
            Self::default()
        })
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.project_id.clone())
            .or_else(crate::gcp::auth::get_default_project)
    }

    /// Get effective endpoint (CLI > environment > config > public API)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(ENDPOINT_ENV).ok())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Set project and save
    pub fn set_project(&mut self, project_id: &str) -> Result<()> {
        self.project_id = Some(project_id.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_project_wins() {
        let config = Config {
            project_id: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.effective_project(Some("from-cli")),
            Some("from-cli".to_string())
        );
        assert_eq!(
            config.effective_project(None),
            Some("from-config".to_string())
        );
    }

    #[test]
    fn test_cli_endpoint_wins() {
        let config = Config {
            endpoint: Some("http://from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.effective_endpoint(Some("http://from-cli")),
            "http://from-cli"
        );
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = std::env::temp_dir().join(format!("bqctl-config-{}", std::process::id()));
        let path = dir.join("config.json");
        let config = Config {
            project_id: Some("proj-a".to_string()),
            endpoint: None,
            page_size: Some(50),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("bqctl-does-not-exist/config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"project_id": "proj-a"}"#).unwrap();
        assert_eq!(config.project_id.as_deref(), Some("proj-a"));
        assert_eq!(config.page_size, None);
    }
}
