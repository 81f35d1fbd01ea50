//! Runtime error types.

use courier_core::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while bootstrapping from configuration.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The transport could not be constructed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
