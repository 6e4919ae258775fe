//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    sweeper::SweeperConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod sweeper;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Discount deactivation sweeper settings.
    #[command(flatten)]
    pub sweeper: SweeperConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::config::observability::LogFormat;

    use super::*;

    #[test]
    fn defaults_apply_when_only_database_url_is_given() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert!(matches!(config.logging.log_format, LogFormat::Compact));
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);
        assert!(config.sweeper.enabled);
        assert_eq!(config.sweeper.interval(), Duration::from_secs(60));

        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--port",
            "9000",
            "--log-format",
            "json",
            "--sweep-enabled",
            "false",
            "--sweep-interval-seconds",
            "5",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:9000");
        assert!(matches!(config.logging.log_format, LogFormat::Json));
        assert!(!config.sweeper.enabled);
        assert_eq!(config.sweeper.interval(), Duration::from_secs(5));

        Ok(())
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--sweep-interval-seconds",
            "0",
        ]);

        assert!(result.is_err(), "expected a parse error for a zero interval");
    }
}
