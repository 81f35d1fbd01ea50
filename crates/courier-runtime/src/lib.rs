//! Courier Runtime - configuration and logging for the Courier bot SDK.
//!
//! This crate provides:
//! - Layered configuration (`CourierConfig`, `ConfigLoader`) from files and
//!   `COURIER_*` environment variables
//! - Logging initialization (`LoggingBuilder`, `init_from_config`)
//! - Construction of the pooled transport from configuration
//!
//! ```ignore
//! use courier_runtime::{CourierConfig, build_transport, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CourierConfig::load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let transport = build_transport(&config.request)?;
//!     let endpoint = config.api.endpoint()?;
//!     courier_core::run_scoped(&transport, || async {
//!         transport.do_request(endpoint.request("getMe")).await
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

use courier_transport::PooledTransport;
use tracing::debug;

pub use config::{
    ApiConfig, ConfigError, ConfigLoader, ConfigResult, CourierConfig, LoggingConfig,
    RequestConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, init_from_config};

/// Builds a pooled transport from request settings.
///
/// The transport is created but not initialized.
pub fn build_transport(request: &RequestConfig) -> RuntimeResult<PooledTransport> {
    let config = request.to_transport_config()?;
    debug!(
        pool_size = config.pool_size,
        proxy = config.proxy_url.is_some(),
        "Building transport from configuration"
    );
    Ok(PooledTransport::new(config)?)
}
