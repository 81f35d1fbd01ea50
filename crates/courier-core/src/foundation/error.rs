//! Unified error types for the Courier core.
//!
//! Every failure surfaced by a context or a transport is one of the variants
//! below. Third-party error types are flattened into these before they leave
//! the crate that produced them.

use thiserror::Error;

// =============================================================================
// Context Errors
// =============================================================================

/// Errors raised synchronously by [`CallbackContext`](crate::CallbackContext)
/// operations.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// A read-only attribute (`bot_data`, `chat_data`, `user_data`, or one of
    /// the forwarding accessors) was the target of a write.
    #[error("cannot assign a new value to '{name}'; mutate the stored data in place instead")]
    ImmutableAttribute {
        /// The attribute name.
        name: String,
    },

    /// A generic attribute write supplied a value of the wrong type for a
    /// fixed field.
    #[error("attribute '{name}' expects a value of type '{expected}'")]
    AttributeType {
        /// The attribute name.
        name: String,
        /// Expected type name.
        expected: &'static str,
    },

    /// The bot does not cache arbitrary callback data.
    #[error("this bot instance does not use arbitrary callback data")]
    CallbackDataDisabled,

    /// The callback-data cache rejected the operation.
    #[error(transparent)]
    CallbackData(#[from] CallbackDataError),
}

impl ContextError {
    /// Creates an immutable-attribute error.
    pub fn immutable(name: impl Into<String>) -> Self {
        Self::ImmutableAttribute { name: name.into() }
    }
}

/// Errors raised by the [`CallbackDataCache`](crate::CallbackDataCache).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackDataError {
    /// The callback query id is not known to the cache.
    #[error("callback query '{0}' not found in the callback data cache")]
    QueryNotFound(String),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur while performing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Any timeout: connect, read, write, or waiting for a pooled connection.
    #[error("request timed out")]
    TimedOut,

    /// Any other transport or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// Invalid transport configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// The request could not be built from the caller's parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Creates a network error.
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network(reason.into())
    }

    /// Returns `true` for [`TransportError::TimedOut`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for context operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
