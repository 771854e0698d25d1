//! Client Settings
//!
//! Where the API lives, how to find the key, and transport deadlines.

use crate::error::{GrokError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "XAI_API_KEY";

/// Client configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key; takes precedence over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional environment variable overriding `base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url_env: Option<String>,

    /// Whole-request deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connection deadline in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

// Long completions can take minutes
fn default_timeout_ms() -> u64 {
    300_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            base_url_env: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Configuration with an explicit key and default everything else
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the whole-request deadline, rounded up to the millisecond
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = whole_millis(timeout);
        self
    }

    /// Set the connection deadline, rounded up to the millisecond
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = whole_millis(timeout);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Fails on a zero deadline, which would expire every request
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(GrokError::Config("timeout_ms must be greater than zero".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(GrokError::Config(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The explicit key, else the one in `api_key_env`
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(GrokError::Config(format!(
                "No API key configured. Set {} or provide `api_key`",
                self.api_key_env
            ))),
        }
    }

    /// The effective base URL (from env var if configured, otherwise default)
    pub fn resolve_base_url(&self) -> String {
        if let Some(env_var) = &self.base_url_env {
            if let Ok(url) = std::env::var(env_var) {
                return url;
            }
        }
        self.base_url.clone()
    }
}

fn whole_millis(duration: Duration) -> u64 {
    let millis = duration.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .field("base_url_env", &self.base_url_env)
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_sub_second_timeouts_are_kept() {
        let config = ClientConfig::new("k")
            .with_timeout(Duration::from_millis(500))
            .with_connect_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert_eq!(config.connect_timeout(), Duration::from_millis(1500));

        let config = ClientConfig::new("k").with_timeout(Duration::from_micros(1));
        assert_eq!(config.timeout(), Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = ClientConfig::new("k").with_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GrokError::Config(_)));
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = ClientConfig {
            api_key_env: "GROK_CLIENT_TEST_UNUSED_KEY".to_string(),
            ..ClientConfig::new("explicit")
        };
        std::env::set_var("GROK_CLIENT_TEST_UNUSED_KEY", "from-env");
        assert_eq!(config.resolve_api_key().unwrap(), "explicit");
    }

    #[test]
    fn test_key_from_env() {
        std::env::set_var("GROK_CLIENT_TEST_KEY", "from-env");
        let config = ClientConfig {
            api_key_env: "GROK_CLIENT_TEST_KEY".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "from-env");
    }

    #[test]
    fn test_missing_key() {
        let config = ClientConfig {
            api_key_env: "GROK_CLIENT_TEST_MISSING_KEY".to_string(),
            ..ClientConfig::default()
        };
        let err = config.resolve_api_key().unwrap_err();
        assert!(matches!(err, GrokError::Config(_)));
        assert!(err.to_string().contains("GROK_CLIENT_TEST_MISSING_KEY"));
    }

    #[test]
    fn test_base_url_env_override() {
        std::env::set_var("GROK_CLIENT_TEST_BASE_URL", "http://localhost:9000/v1");
        let mut config = ClientConfig::new("k");
        assert_eq!(config.resolve_base_url(), DEFAULT_BASE_URL);

        config.base_url_env = Some("GROK_CLIENT_TEST_BASE_URL".to_string());
        assert_eq!(config.resolve_base_url(), "http://localhost:9000/v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", ClientConfig::new("xai-secret"));
        assert!(!rendered.contains("xai-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
