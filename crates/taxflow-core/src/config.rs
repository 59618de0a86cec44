//! Configuration file management for TaxFlow.
//!
//! Reads `~/.config/taxflow/config.toml` when present; environment variables
//! override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TaxflowError};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_BACKEND_URL: &str = "TAXFLOW_BACKEND_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "TAXFLOW_REQUEST_TIMEOUT_SECS";
pub const ENV_LOG: &str = "TAXFLOW_LOG";

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxflowConfig {
    /// Origin of the backend, without trailing `/api`
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for TaxflowConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}

impl TaxflowConfig {
    /// Loads configuration from the default path, then applies environment overrides.
    ///
    /// Priority:
    /// 1. Environment variables (TAXFLOW_BACKEND_URL, TAXFLOW_REQUEST_TIMEOUT_SECS, TAXFLOW_LOG)
    /// 2. ~/.config/taxflow/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads configuration from a file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[Config] No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TaxflowError::io(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)?;
        tracing::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Applies overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                TaxflowError::config(format!("{ENV_REQUEST_TIMEOUT_SECS} must be a number, got '{raw}'"))
            })?;
            self.request_timeout_secs = Some(secs);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }

    /// Backend origin without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

/// Returns the path to the configuration file: ~/.config/taxflow/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("taxflow").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TaxflowConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, TaxflowConfig::default());
        assert_eq!(config.base_url(), "http://localhost:8001");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend_url = \"https://tax.example.com/\"\n").unwrap();

        let config = TaxflowConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url(), "https://tax.example.com");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend_url = [").unwrap();

        let err = TaxflowConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, TaxflowError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BACKEND_URL, "http://127.0.0.1:9000"),
            (ENV_REQUEST_TIMEOUT_SECS, "45"),
        ]);
        let mut config = TaxflowConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, Some(45));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let mut config = TaxflowConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_REQUEST_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, TaxflowError::Config(_)));
    }
}
