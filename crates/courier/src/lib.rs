//! # Courier
//!
//! The data and transport substrate for building bots against an HTTP bot API.
//!
//! ## Overview
//!
//! Courier provides two pieces that higher layers (update dispatch, API
//! method wrappers, persistence) build on:
//!
//! - **Execution context**: a [`CallbackContext`](core::CallbackContext) is
//!   built for every dispatched update, job run or error. It binds the
//!   per-chat, per-user and bot-wide data stores and carries per-invocation
//!   values (command arguments, pattern matches, the error being handled).
//! - **Transport**: a [`PooledTransport`](transport::PooledTransport) issues
//!   one HTTP call per request over a bounded connection pool, with per-call
//!   timeout overrides and a two-kind fault taxonomy (timed out vs network).
//!
//! ```text
//! ┌────────────┐     ┌─────────────────┐     ┌──────────────┐     ┌─────────┐
//! │ Dispatcher │────▶│ CallbackContext │────▶│   Handlers   │────▶│Transport│──▶ API
//! └────────────┘     └─────────────────┘     └──────────────┘     └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CourierConfig::load()?;
//!     init_from_config(&config.logging);
//!
//!     let transport = build_transport(&config.request)?;
//!     let request = config
//!         .api
//!         .endpoint()?
//!         .request("getMe")
//!         .with_timeouts(TimeoutOverrides::none().read(Duration::from_secs(30)));
//!
//!     let response = run_scoped(&transport, || transport.do_request(request)).await?;
//!     println!("{}", String::from_utf8_lossy(&response.body));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http-client` (default): reqwest-backed pooled transport
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_runtime as runtime;
pub use courier_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Context and collaborators
    pub use courier_core::prelude::*;
    pub use courier_core::{
        CallbackDataCache, ContextValue, DataStores, Job, JobQueue, KeyedStore, Persistence,
        PersistenceInput, shared,
    };

    // Transport
    pub use courier_core::{Timeouts, run_scoped};
    #[cfg(feature = "http-client")]
    pub use courier_transport::{PooledTransport, PooledTransportConfig};

    // Runtime
    pub use courier_runtime::{
        ConfigLoader, CourierConfig, LoggingBuilder, build_transport, init_from_config,
    };

    pub use std::time::Duration;
}
