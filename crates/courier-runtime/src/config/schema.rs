//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use courier_core::{DEFAULT_BASE_URL, Endpoint, Timeouts};
use courier_transport::PooledTransportConfig;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [request]
/// pool_size = 8
/// read_timeout = 10.0
///
/// [api]
/// token = "123:abc"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Transport settings.
    pub request: RequestConfig,
    /// Remote API settings.
    pub api: ApiConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` otherwise.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level, overridden by `RUST_LOG` when set.
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Target file when `output = "file"`.
    pub file_path: Option<PathBuf>,
    /// Include thread ids.
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-module levels, e.g. `courier_transport = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Request
// =============================================================================

/// Transport configuration. Timeouts are in seconds; `None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub pool_size: usize,
    pub proxy_url: Option<String>,
    pub connect_timeout: Option<f64>,
    pub read_timeout: Option<f64>,
    pub write_timeout: Option<f64>,
    pub pool_timeout: Option<f64>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            proxy_url: None,
            connect_timeout: Some(5.0),
            read_timeout: Some(5.0),
            write_timeout: Some(5.0),
            pool_timeout: Some(1.0),
        }
    }
}

fn seconds(name: &str, value: Option<f64>) -> ConfigResult<Option<Duration>> {
    value
        .map(|secs| {
            if secs <= 0.0 {
                return Err(ConfigError::validation(format!(
                    "request.{name} must be greater than 0, got {secs}"
                )));
            }
            Duration::try_from_secs_f64(secs).map_err(|e| {
                ConfigError::validation(format!("request.{name} is not a valid duration: {e}"))
            })
        })
        .transpose()
}

impl RequestConfig {
    /// Returns the configured timeouts.
    pub fn timeouts(&self) -> ConfigResult<Timeouts> {
        Ok(Timeouts {
            connect: seconds("connect_timeout", self.connect_timeout)?,
            read: seconds("read_timeout", self.read_timeout)?,
            write: seconds("write_timeout", self.write_timeout)?,
            pool: seconds("pool_timeout", self.pool_timeout)?,
        })
    }

    /// Converts to the transport's configuration, validating it.
    pub fn to_transport_config(&self) -> ConfigResult<PooledTransportConfig> {
        let config = PooledTransportConfig {
            pool_size: self.pool_size,
            proxy_url: self.proxy_url.clone(),
            timeouts: self.timeouts()?,
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// API
// =============================================================================

/// Remote API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Builds the endpoint. Fails if no token is configured.
    pub fn endpoint(&self) -> ConfigResult<Endpoint> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::missing_field("api.token"))?;
        Ok(Endpoint::with_base_url(&self.base_url, token))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
