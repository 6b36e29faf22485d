//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use bracket_engine::db::{DatabaseConfig, DatabaseConfigError};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Address used when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Where tournaments, participants and matches are kept
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process-local maps, lost on restart
    Memory,
    /// PostgreSQL through sqlx
    Postgres(DatabaseConfig),
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub backend: StoreBackend,
    /// Prometheus scrape listener, disabled when `None`
    pub metrics_bind: Option<SocketAddr>,
}

/// Values given on the command line, each one wins over its env variable
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub memory: bool,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `SERVER_BIND`, `METRICS_BIND`, `BRACKET_STORE` (`memory` or
    /// `postgres`) and, for the postgres backend, the `DATABASE_URL` / `DB_*`
    /// variables understood by [`DatabaseConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let metrics_bind = match overrides.metrics_bind {
            Some(addr) => Some(addr),
            None => parse_env("METRICS_BIND")?,
        };

        let memory = overrides.memory
            || match std::env::var("BRACKET_STORE") {
                Ok(value) => match value.to_lowercase().as_str() {
                    "memory" => true,
                    "postgres" => false,
                    _ => {
                        return Err(ConfigError::Invalid {
                            var: "BRACKET_STORE".to_string(),
                            reason: format!("Expected `memory` or `postgres`, got {value:?}"),
                        });
                    }
                },
                Err(_) => false,
            };

        let backend = if memory {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres(database_config(overrides.database_url)?)
        };

        Ok(ServerConfig {
            bind,
            backend,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        if let StoreBackend::Postgres(database) = &self.backend {
            if database.database_url.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Pass --db-url or run with --memory".to_string(),
                });
            }

            if database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        database.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl From<DatabaseConfigError> for ConfigError {
    fn from(err: DatabaseConfigError) -> Self {
        match err {
            DatabaseConfigError::MissingUrl => ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Pass --db-url or run with --memory".to_string(),
            },
            DatabaseConfigError::InvalidNumber { name, value } => ConfigError::Invalid {
                var: name.to_string(),
                reason: format!("Must be a number, got {value:?}"),
            },
        }
    }
}

/// `--db-url` only has to stand in for `DATABASE_URL`; pool sizes still come from env
fn database_config(url_override: Option<String>) -> Result<DatabaseConfig, ConfigError> {
    let mut database = match (DatabaseConfig::from_env(), &url_override) {
        (Ok(config), _) => config,
        (Err(DatabaseConfigError::MissingUrl), Some(_)) => DatabaseConfig::development(),
        (Err(e), _) => return Err(e.into()),
    };

    if let Some(url) = url_override {
        database.database_url = url;
    }
    Ok(database)
}

/// Parse an optional environment variable, rejecting values that are set but malformed
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("{e}"),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres_config(max_connections: u32, min_connections: u32) -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            backend: StoreBackend::Postgres(DatabaseConfig {
                max_connections,
                min_connections,
                ..DatabaseConfig::development()
            }),
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Use --memory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Use --memory"));
    }

    #[test]
    fn test_default_bind() {
        assert_eq!(DEFAULT_BIND.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_memory_config_is_valid() {
        let config = ServerConfig {
            bind: DEFAULT_BIND,
            backend: StoreBackend::Memory,
            metrics_bind: Some("127.0.0.1:9090".parse().unwrap()),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_metrics_bind_must_differ() {
        let config = ServerConfig {
            bind: DEFAULT_BIND,
            backend: StoreBackend::Memory,
            metrics_bind: Some(DEFAULT_BIND),
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
    }

    #[test]
    fn test_config_validation_zero_pool() {
        let err = postgres_config(0, 0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_config_validation_min_above_max() {
        let err = postgres_config(5, 10).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MIN_CONNECTIONS"));
    }

    #[test]
    fn test_database_error_conversion() {
        let err: ConfigError = DatabaseConfigError::InvalidNumber {
            name: "DB_MAX_CONNECTIONS",
            value: "lots".to_string(),
        }
        .into();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
        assert!(err.to_string().contains("lots"));

        let err: ConfigError = DatabaseConfigError::MissingUrl.into();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_parse_env_unset_is_none() {
        let value: Option<SocketAddr> = parse_env("BRACKET_SERVER_TEST_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
