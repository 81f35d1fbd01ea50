//! Configuration of the pooled transport.

use std::time::Duration;

use courier_core::{Timeouts, TransportError, TransportResult};

/// Proxy schemes the transport can route through.
pub const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Configuration for [`PooledTransport`](super::PooledTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PooledTransportConfig {
    /// Maximum concurrent connections, also the keep-alive pool size.
    pub pool_size: usize,
    /// Optional proxy, e.g. `http://127.0.0.1:3128`.
    pub proxy_url: Option<String>,
    /// Default timeouts; overridable per call.
    pub timeouts: Timeouts,
}

impl Default for PooledTransportConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            proxy_url: None,
            timeouts: Timeouts::default(),
        }
    }
}

impl PooledTransportConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Routes requests through a proxy.
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Replaces all default timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Sets the default connect timeout.
    pub fn with_connect_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeouts.connect = timeout.into();
        self
    }

    /// Sets the default read timeout.
    pub fn with_read_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeouts.read = timeout.into();
        self
    }

    /// Sets the default write timeout.
    pub fn with_write_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeouts.write = timeout.into();
        self
    }

    /// Sets the default pool-wait timeout.
    pub fn with_pool_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeouts.pool = timeout.into();
        self
    }

    /// Checks the pool size and proxy scheme.
    pub fn validate(&self) -> TransportResult<()> {
        if self.pool_size == 0 {
            return Err(TransportError::InvalidConfig(
                "connection pool size must be at least 1".into(),
            ));
        }

        if let Some(proxy) = &self.proxy_url {
            let scheme = proxy.split_once("://").map(|(scheme, _)| scheme);
            if !scheme.is_some_and(|s| PROXY_SCHEMES.contains(&s)) {
                return Err(TransportError::InvalidConfig(format!(
                    "unsupported proxy url '{proxy}', expected one of {PROXY_SCHEMES:?}"
                )));
            }
        }

        Ok(())
    }
}
