//! Client configuration.

use serde::Deserialize;
use std::time::Duration;

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    30
}

/// Configuration for [`crate::RestIdentityStore`].
#[derive(Debug, Clone, Deserialize)]
pub struct RestIdentityConfig {
    /// Base URL of the identity provider, without a trailing slash.
    pub base_url: String,
    /// Service token for admin endpoints.
    pub service_token: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-request read timeout in seconds.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl RestIdentityConfig {
    /// Build a config with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>, service_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            service_token: service_token.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }

    /// Connection timeout as a [`Duration`].
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a [`Duration`].
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Validate required fields.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be http(s): {}", self.base_url));
        }
        if self.service_token.is_empty() {
            return Err("service_token must not be empty".to_string());
        }
        Ok(())
    }
}

impl std::fmt::Display for RestIdentityConfig {
    // Never prints the service token.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "identity store at {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = RestIdentityConfig::new("https://idp.example.org/", "token");
        assert_eq!(config.base_url, "https://idp.example.org");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = RestIdentityConfig::new("ftp://idp.example.org", "token");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = RestIdentityConfig::new("https://idp.example.org", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_hides_token() {
        let config = RestIdentityConfig::new("https://idp.example.org", "super-secret");
        assert!(!config.to_string().contains("super-secret"));
    }
}
