//! # Courier Transport
//!
//! Concrete implementations of the [`Transport`](courier_core::Transport)
//! contract defined in `courier-core`.
//!
//! ## Features
//!
//! - `http-client` (default): pooled HTTP client built on `reqwest`
//! - `full`: all transports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  API method layer   │  (sendMessage, getUpdates, ...)
//! │  (builds requests)  │
//! ├─────────────────────┤
//! │  courier-core       │  (Transport contract, RequestDescriptor)
//! ├─────────────────────┤
//! │  courier-transport  │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (TCP/HTTP) │
//! └─────────────────────┘
//! ```
//!
//! ## Fault mapping
//!
//! | Underlying condition | Surfaced as |
//! |----------------------|-------------|
//! | Any timeout (connect, read, write, pool wait) | `TransportError::TimedOut` |
//! | Any other client failure, use after `stop` | `TransportError::Network` |
//! | Bad pool size or proxy at construction | `TransportError::InvalidConfig` |
//! | Unencodable parameter or bad MIME type | `TransportError::InvalidRequest` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_core::{Endpoint, RequestData, Transport, run_scoped};
//! use courier_transport::{PooledTransport, PooledTransportConfig};
//!
//! let transport = PooledTransport::new(PooledTransportConfig::new().with_pool_size(8))?;
//! let endpoint = Endpoint::new(token);
//!
//! run_scoped(&transport, || async {
//!     let me = transport.do_request(endpoint.request("getMe")).await?;
//!     println!("{}", String::from_utf8_lossy(&me.body));
//!     Ok::<_, courier_core::TransportError>(())
//! })
//! .await?;
//! ```

// Transport implementations (feature-gated)
#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::{PooledTransport, PooledTransportConfig};
