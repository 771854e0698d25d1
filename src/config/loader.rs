//! Configuration Loader
//!
//! Builds a [`ClientConfig`] from a JSON file or from the environment.

use crate::config::settings::ClientConfig;
use crate::error::{GrokError, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader {
    config: ClientConfig,
}

impl ConfigLoader {
    /// Defaults, with a `.env` file in the working directory loaded first
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::trace!(error = %e, "no .env file loaded");
        }

        Self {
            config: ClientConfig::default(),
        }
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GrokError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ClientConfig = serde_json::from_str(&content).map_err(|e| {
            GrokError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loaded client config");
        Ok(Self { config })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_custom_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "api_key_env": "CUSTOM_GROK_KEY",
                "base_url": "https://custom.api.com/v1",
                "timeout_ms": 30000
            }}"#
        )
        .unwrap();

        let config = ConfigLoader::from_path(file.path()).unwrap().into_config();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_key_env, "CUSTOM_GROK_KEY");
        assert_eq!(config.base_url, "https://custom.api.com/v1");
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.connect_timeout_ms, 10_000);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::from_path("/nonexistent/grok.json").err().unwrap();
        assert!(matches!(err, GrokError::Config(_)));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let err = ConfigLoader::from_path(file.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_from_env_uses_defaults() {
        let loader = ConfigLoader::from_env();
        assert_eq!(loader.config().base_url, crate::config::DEFAULT_BASE_URL);
    }
}
