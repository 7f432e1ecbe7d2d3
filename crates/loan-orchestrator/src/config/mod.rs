use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub gateways: GatewayConfig,
    pub financial: FinancialHistoryConfig,
}

const DEFAULT_SCORING_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 5_000;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            gateways: GatewayConfig::from_env()?,
            financial: FinancialHistoryConfig::from_env()?,
        })
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

/// Where the four scoring services live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    /// Reference services running inside the orchestrator process.
    Local,
    /// JSON-over-HTTP calls to separately deployed services.
    Remote,
}

impl GatewayMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "in-process" => Ok(Self::Local),
            "remote" | "http" => Ok(Self::Remote),
            other => Err(ConfigError::InvalidGatewayMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    pub extraction_url: String,
    pub solvency_url: String,
    pub property_url: String,
    pub approval_url: String,
    /// Upper bound for one gateway round-trip.
    pub timeout: Duration,
}

impl GatewayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mode = GatewayMode::parse(
            &env::var("APP_GATEWAY_MODE").unwrap_or_else(|_| "local".to_string()),
        )?;

        let base = env::var("APP_SCORING_URL").unwrap_or_else(|_| DEFAULT_SCORING_URL.to_string());
        let service_url = |key: &str| env::var(key).unwrap_or_else(|_| base.clone());

        let timeout_ms = match env::var("APP_GATEWAY_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_GATEWAY_TIMEOUT_MS,
        };

        Ok(Self {
            mode,
            extraction_url: service_url("APP_EXTRACTION_URL"),
            solvency_url: service_url("APP_SOLVENCY_URL"),
            property_url: service_url("APP_PROPERTY_URL"),
            approval_url: service_url("APP_APPROVAL_URL"),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Seed policy for synthesizing financial history of first-time clients.
#[derive(Debug, Clone, Default)]
pub struct FinancialHistoryConfig {
    pub seed: Option<u64>,
}

impl FinancialHistoryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let seed = match env::var("APP_FINANCIAL_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed)?,
            ),
            Err(_) => None,
        };
        Ok(Self { seed })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidGatewayMode(String),
    InvalidTimeout,
    InvalidSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidGatewayMode(value) => {
                write!(f, "APP_GATEWAY_MODE must be 'local' or 'remote' (got '{value}')")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_GATEWAY_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::InvalidSeed => write!(f, "APP_FINANCIAL_SEED must be a valid u64"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidGatewayMode(_)
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidSeed => None,
        }
    }
}
