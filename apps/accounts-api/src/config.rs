//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid, or
//! the application exits with a clear error message.

use std::env;
use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the identity provider's HTTP API.
    pub identity_base_url: String,

    /// Service token for the identity provider's admin endpoints.
    pub identity_service_token: String,

    /// PostgreSQL connection string for bindings and profiles.
    pub database_url: String,

    /// Organizational mail domain login addresses derive into.
    pub account_domain: String,

    /// The single address the bootstrap endpoint will provision.
    pub bootstrap_address: String,

    /// Specialty assigned to auto-created doctor profiles.
    pub default_specialty: String,

    /// Server bind address.
    pub host: String,

    /// Server listen port.
    pub port: u16,

    /// Tracing filter directive (e.g., "info,medipass=debug").
    pub rust_log: String,

    /// Whether to run pending migrations at startup.
    pub run_migrations: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("identity_base_url", &self.identity_base_url)
            .field("identity_service_token", &"[redacted]")
            .field("database_url", &"[redacted]")
            .field("account_domain", &self.account_domain)
            .field("bootstrap_address", &self.bootstrap_address)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("run_migrations", &self.run_migrations)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `IDENTITY_BASE_URL` - Identity provider base URL
    /// - `IDENTITY_SERVICE_TOKEN` - Service token for admin endpoints
    /// - `DATABASE_URL` - PostgreSQL connection string
    ///
    /// # Optional Variables
    ///
    /// - `ACCOUNT_DOMAIN` - Mail domain (default: "hospital.example.org")
    /// - `BOOTSTRAP_ADDRESS` - Bootstrap admin address
    ///   (default: "admin@" + account domain)
    /// - `DEFAULT_SPECIALTY` - Doctor specialty default
    ///   (default: "General Medicine")
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8080)
    /// - `RUST_LOG` - Log filter (default: "info")
    /// - `RUN_MIGRATIONS` - Run migrations at startup (default: true)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let identity_base_url = env::var("IDENTITY_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_BASE_URL".to_string()))?;

        let identity_service_token = env::var("IDENTITY_SERVICE_TOKEN")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_SERVICE_TOKEN".to_string()))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let account_domain = env::var("ACCOUNT_DOMAIN")
            .unwrap_or_else(|_| "hospital.example.org".to_string())
            .trim()
            .to_lowercase();
        if account_domain.is_empty() || account_domain.contains('@') {
            return Err(ConfigError::InvalidValue {
                var: "ACCOUNT_DOMAIN".to_string(),
                message: "Must be a bare mail domain without '@'".to_string(),
            });
        }

        let bootstrap_address = env::var("BOOTSTRAP_ADDRESS")
            .unwrap_or_else(|_| format!("admin@{account_domain}"));

        let default_specialty =
            env::var("DEFAULT_SPECIALTY").unwrap_or_else(|_| "General Medicine".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: format!("Must be a port number: {e}"),
            })?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let run_migrations = env::var("RUN_MIGRATIONS")
            .map(|s| !matches!(s.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Config {
            identity_base_url,
            identity_service_token,
            database_url,
            account_domain,
            bootstrap_address,
            default_specialty,
            host,
            port,
            rust_log,
            run_migrations,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            identity_base_url: "https://idp.hospital.example.org".to_string(),
            identity_service_token: "service-token".to_string(),
            database_url: "postgres://localhost/directory".to_string(),
            account_domain: "hospital.example.org".to_string(),
            bootstrap_address: "admin@hospital.example.org".to_string(),
            default_specialty: "General Medicine".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            rust_log: "info".to_string(),
            run_migrations: true,
        }
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(test_config().bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("service-token"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DATABASE_URL"
        );
    }
}
