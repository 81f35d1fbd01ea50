//! The transport contract.
//!
//! A [`Transport`] performs exactly one HTTP call per
//! [`do_request`](Transport::do_request) and reports failures using the
//! [`TransportError`] taxonomy only. Retrying, rate limiting and interpreting
//! API-level errors are left to the layers above.

use std::future::Future;

use async_trait::async_trait;
use tracing::warn;

use crate::foundation::{TransportError, TransportResult};
use crate::transport::request::{RequestDescriptor, TransportResponse};

/// Performs HTTP calls to the remote bot API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Maximum number of connections the transport uses concurrently.
    fn connection_pool_size(&self) -> usize;

    /// Acquires network resources. Calling it again is a no-op.
    async fn initialize(&self) -> TransportResult<()>;

    /// Releases every pooled connection. Requests issued afterwards fail.
    async fn stop(&self) -> TransportResult<()>;

    /// Issues one HTTP call. Never retries.
    async fn do_request(&self, request: RequestDescriptor) -> TransportResult<TransportResponse>;
}

/// Errors from [`run_scoped`]: either the transport failed to start, or the
/// scoped body failed.
#[derive(Debug, thiserror::Error)]
pub enum ScopedError<E> {
    /// `initialize` failed; the body never ran.
    #[error("transport failed to initialize: {0}")]
    Initialize(TransportError),

    /// The body returned an error.
    #[error(transparent)]
    Body(E),
}

/// Runs `body` between `initialize` and `stop`.
///
/// `stop` runs on every path, including when `initialize` or `body` fails.
/// A failure of `stop` itself is logged and does not mask the body's result.
pub async fn run_scoped<T, F, Fut, R, E>(transport: &T, body: F) -> Result<R, ScopedError<E>>
where
    T: Transport + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let result = match transport.initialize().await {
        Ok(()) => body().await.map_err(ScopedError::Body),
        Err(e) => Err(ScopedError::Initialize(e)),
    };

    if let Err(e) = transport.stop().await {
        warn!(error = %e, "Failed to stop transport");
    }

    result
}
