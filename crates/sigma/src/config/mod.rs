use crate::surveillance::ciaf::{CiafConfig, CiafConfigError};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ciaf: CiafConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ciaf: load_ciaf()?,
        })
    }
}

/// CIAF constants are tunable heuristics; each may be overridden from the env.
fn load_ciaf() -> Result<CiafConfig, ConfigError> {
    let defaults = CiafConfig::default();
    let config = CiafConfig {
        triple_failure_factor: env_or("APP_CIAF_TRIPLE_FACTOR", defaults.triple_failure_factor)?,
        stunting_underweight_factor: env_or(
            "APP_CIAF_STUNTING_UNDERWEIGHT_FACTOR",
            defaults.stunting_underweight_factor,
        )?,
        wasting_underweight_factor: env_or(
            "APP_CIAF_WASTING_UNDERWEIGHT_FACTOR",
            defaults.wasting_underweight_factor,
        )?,
        referral_rate_pct: env_or("APP_CIAF_REFERRAL_RATE", defaults.referral_rate_pct)?,
        referral_count: env_or("APP_CIAF_REFERRAL_COUNT", defaults.referral_count)?,
        feeding_rate_pct: env_or("APP_CIAF_FEEDING_RATE", defaults.feeding_rate_pct)?,
        feeding_count: env_or("APP_CIAF_FEEDING_COUNT", defaults.feeding_count)?,
        outreach_rate_pct: env_or("APP_CIAF_OUTREACH_RATE", defaults.outreach_rate_pct)?,
    };

    config.validate().map_err(ConfigError::Ciaf)?;
    Ok(config)
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    Ciaf(CiafConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a number"),
            ConfigError::Ciaf(err) => write!(f, "invalid CIAF settings: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Ciaf(err) => Some(err),
        }
    }
}
