//! Environment-driven configuration for the aggregation service. All
//! variables carry the `ATLAS_` prefix; a local `.env` file is honored in
//! development.

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Year range the engine accepts for observations and queries.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the aggregation service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("ATLAS_ENV", "development"));

        let host = env_or("ATLAS_HOST", "127.0.0.1");
        let port = env_or("ATLAS_PORT", "8000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let current_year_override = match env::var("ATLAS_CURRENT_YEAR") {
            Ok(value) => Some(parse_current_year(&value)?),
            Err(_) => None,
        };

        let log_level = env_or("ATLAS_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            engine: EngineConfig {
                current_year_override,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_current_year(value: &str) -> Result<i32, ConfigError> {
    let year = value
        .trim()
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidCurrentYear {
            value: value.to_string(),
        })?;
    if !YEAR_RANGE.contains(&year) {
        return Err(ConfigError::InvalidCurrentYear {
            value: value.to_string(),
        });
    }
    Ok(year)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Knobs for the aggregation engine itself.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pins the reference year of the confidence classifier instead of the
    /// wall clock, so scheduled re-runs and fixtures produce identical
    /// tiers. Unset in normal operation.
    pub current_year_override: Option<i32>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCurrentYear { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "ATLAS_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "ATLAS_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCurrentYear { value } => {
                write!(
                    f,
                    "ATLAS_CURRENT_YEAR must be a year in {}..={}, got '{value}'",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidCurrentYear { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("ATLAS_ENV");
        env::remove_var("ATLAS_HOST");
        env::remove_var("ATLAS_PORT");
        env::remove_var("ATLAS_CURRENT_YEAR");
        env::remove_var("ATLAS_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.engine.current_year_override, None);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8000));
        env::remove_var("ATLAS_HOST");
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_PORT", "not-a-port");
        let err = AppConfig::load().expect_err("port must fail");
        assert!(matches!(err, ConfigError::InvalidPort));
        env::remove_var("ATLAS_PORT");
    }

    #[test]
    fn pins_current_year_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_CURRENT_YEAR", "2025");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.current_year_override, Some(2025));
        env::remove_var("ATLAS_CURRENT_YEAR");
    }

    #[test]
    fn rejects_out_of_range_current_year() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATLAS_CURRENT_YEAR", "1066");
        let err = AppConfig::load().expect_err("ancient year must fail");
        assert!(matches!(err, ConfigError::InvalidCurrentYear { .. }));
        env::remove_var("ATLAS_CURRENT_YEAR");
    }
}
