//! HTTP transport.
//!
//! This module provides the pooled `reqwest` client implementation.

mod client;
mod config;

pub use client::PooledTransport;
pub use config::{PROXY_SCHEMES, PooledTransportConfig};
