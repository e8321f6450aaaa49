//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use atlas_connectors::{EXCHANGE_URL, RESTCOUNTRIES_URL};
use std::env;
use std::path::PathBuf;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// External source endpoints
    pub sources: SourceConfig,

    /// Summary artifact configuration
    pub summary: SummaryConfig,

    /// PostgreSQL URL; unset means the in-memory backend
    pub database_url: Option<String>,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// External source endpoints.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub countries_url: String,
    pub exchange_url: String,
}

/// Summary artifact configuration.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Where the generated summary image is written and served from
    pub image_path: PathBuf,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (uses stubs)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let sources = Self::load_source_config();
        let summary = Self::load_summary_config();
        let database_url = env::var("DATABASE_URL").ok();

        Ok(Self {
            api,
            sources,
            summary,
            database_url,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            sources: SourceConfig {
                countries_url: "http://127.0.0.1:0/countries".to_string(),
                exchange_url: "http://127.0.0.1:0/rates".to_string(),
            },
            summary: SummaryConfig {
                image_path: PathBuf::from("cache/test-summary.png"),
            },
            database_url: None,
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("ATLAS_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid ATLAS_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("ATLAS_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("ATLAS_API_PORT").unwrap_or_else(|_| "8080".to_string());

        let port = port_str
            .parse::<u16>()
            .map_err(|_| DaemonError::Config(format!("Invalid ATLAS_API_PORT: {}", port_str)))?;

        Ok(ApiConfig { host, port })
    }

    fn load_source_config() -> SourceConfig {
        SourceConfig {
            countries_url: env::var("ATLAS_COUNTRIES_URL")
                .unwrap_or_else(|_| RESTCOUNTRIES_URL.to_string()),
            exchange_url: env::var("ATLAS_EXCHANGE_URL")
                .unwrap_or_else(|_| EXCHANGE_URL.to_string()),
        }
    }

    fn load_summary_config() -> SummaryConfig {
        SummaryConfig {
            image_path: env::var("ATLAS_SUMMARY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cache/summary.png")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            sources: SourceConfig {
                countries_url: RESTCOUNTRIES_URL.to_string(),
                exchange_url: EXCHANGE_URL.to_string(),
            },
            summary: SummaryConfig {
                image_path: PathBuf::from("cache/summary.png"),
            },
            database_url: None,
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.database_url.is_none());
        assert!(config.sources.countries_url.contains("restcountries"));
    }

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.api.port, 0);
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
