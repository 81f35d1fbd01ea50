//! Configuration loading and validation.
//!
//! Settings for logging, the pooled transport and the remote API are read
//! from TOML/YAML files and `COURIER_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigLoader, ENV_PREFIX, PROFILE_ENV, Profile, load_config, load_config_from_file,
};
pub use schema::{
    ApiConfig, CourierConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RequestConfig,
};
pub use validation::validate_config;

impl CourierConfig {
    /// Loads configuration from the default locations.
    pub fn load() -> ConfigResult<Self> {
        load_config()
    }
}
