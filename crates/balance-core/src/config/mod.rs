//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `BALANCE_CONFIG` env var (default
//!    `config/config.toml`, optional)
//! 3. **Environment variables**: `BALANCE__*` env vars override specific fields
//! 4. **Legacy variables**: `PORT` and `ETH_CLIENT_<N>_URL` / `ETH_CLIENT_<N>_NAME`
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, request deadline)
//! - [`EndpointEntry`]: Upstream JSON-RPC endpoints
//! - [`HealthCheckConfig`]: Probe cadence and timeout
//! - [`MetricsConfig`]: Prometheus metrics endpoint
//! - [`LoggingConfig`]: Log level and format
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! bind_port = 8080
//! request_timeout_seconds = 15
//!
//! [[endpoints]]
//! name = "primary"
//! url = "https://eth-mainnet.example.com"
//! timeout_seconds = 10
//! ```

use crate::types::EndpointConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, time::Duration};

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `0.0.0.0`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `8080`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Deadline for one balance request across all endpoints. Defaults to `15`.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_request_timeout_seconds() -> u64 {
    15
}

/// One upstream JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    /// Display name. Defaults to `client-<N>` with N the 1-based position in the list.
    #[serde(default)]
    pub name: Option<String>,

    /// HTTP(S) URL of the endpoint.
    pub url: String,

    /// Per-call timeout in seconds. Defaults to `10`.
    #[serde(default = "default_endpoint_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint_timeout_seconds() -> u64 {
    10
}

/// Liveness probing of upstream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Interval between sweeps in seconds. Must be greater than 0. Defaults to `30`.
    #[serde(default = "default_health_interval_seconds")]
    pub interval_seconds: u64,

    /// Timeout of a single probe in seconds. Must be greater than 0. Defaults to `5`.
    #[serde(default = "default_probe_timeout_seconds")]
    pub probe_timeout_seconds: u64,
}

fn default_health_interval_seconds() -> u64 {
    30
}

fn default_probe_timeout_seconds() -> u64 {
    5
}

/// Prometheus metrics export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether `/metrics` is served. Defaults to `true`.
    pub enabled: bool,
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream endpoints in configuration order. The order seeds the consensus tie-break.
    #[serde(default)]
    pub endpoints: Vec<EndpointEntry>,

    #[serde(default)]
    pub health_check: HealthCheckConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_health_interval_seconds(),
            probe_timeout_seconds: default_probe_timeout_seconds(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            endpoints: Vec::new(),
            health_check: HealthCheckConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `BALANCE__` prefix can override any configuration value.
    /// Use `__` as a separator for nested fields (e.g., `BALANCE__SERVER__BIND_PORT=9000`).
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("server.bind_address", "0.0.0.0")?
            .set_default("server.bind_port", 8080)?
            .set_default("server.request_timeout_seconds", 15)?
            .set_default("health_check.interval_seconds", 30)?
            .set_default("health_check.probe_timeout_seconds", 5)?
            .set_default("metrics.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("BALANCE").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads the full layered configuration, including legacy environment variables.
    ///
    /// The config file path can be overridden using the `BALANCE_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("BALANCE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&config_path)?;
        config.apply_legacy_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `PORT` and the numbered `ETH_CLIENT_<N>_URL` / `ETH_CLIENT_<N>_NAME` variables.
    ///
    /// Numbering starts at 1 and stops at the first missing URL. Legacy endpoints are appended
    /// after the ones already configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Message`] if `PORT` is not a valid port number.
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.bind_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Message(format!("invalid PORT value: {port}")))?;
        }

        for index in 1.. {
            let Some(url) = lookup(&format!("ETH_CLIENT_{index}_URL")).filter(|u| !u.is_empty())
            else {
                break;
            };
            let name = lookup(&format!("ETH_CLIENT_{index}_NAME")).filter(|n| !n.is_empty());
            self.endpoints.push(EndpointEntry {
                name,
                url,
                timeout_seconds: default_endpoint_timeout_seconds(),
            });
        }

        Ok(())
    }

    /// Resolves endpoint entries into the static configs the registry is built from.
    #[must_use]
    pub fn to_endpoint_configs(&self) -> Vec<EndpointConfig> {
        self.endpoints
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                EndpointConfig::new(
                    resolved_name(position, entry),
                    entry.url.clone(),
                    Duration::from_secs(entry.timeout_seconds),
                )
            })
            .collect()
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    ///
    /// [`SocketAddr`]: std::net::SocketAddr
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    #[must_use]
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check.interval_seconds)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check.probe_timeout_seconds)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - At least one endpoint is configured
    /// - Endpoint URLs start with `http` and resolved names are unique
    /// - All durations and the port are greater than zero
    /// - The probe timeout is shorter than both the request timeout and the check interval
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("No Ethereum clients configured".to_string());
        }

        let mut names = HashSet::with_capacity(self.endpoints.len());
        for (position, entry) in self.endpoints.iter().enumerate() {
            let name = resolved_name(position, entry);
            if !entry.url.starts_with("http") {
                return Err(format!("Invalid URL for endpoint {name}: {}", entry.url));
            }
            if entry.timeout_seconds == 0 {
                return Err(format!("Timeout for endpoint {name} must be greater than 0"));
            }
            if !names.insert(name.clone()) {
                return Err(format!("Duplicate endpoint name: {name}"));
            }
        }

        if self.server.request_timeout_seconds == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.health_check.interval_seconds == 0 {
            return Err("Health check interval must be greater than 0".to_string());
        }

        if self.health_check.probe_timeout_seconds == 0 {
            return Err("Health probe timeout must be greater than 0".to_string());
        }

        if self.health_check.probe_timeout_seconds >= self.server.request_timeout_seconds {
            return Err(
                "Health probe timeout must be shorter than the request timeout".to_string(),
            );
        }

        if self.health_check.probe_timeout_seconds >= self.health_check.interval_seconds {
            return Err("Health probe timeout must be shorter than the check interval".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}

fn resolved_name(position: usize, entry: &EndpointEntry) -> String {
    match entry.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("client-{}", position + 1),
    }
}
