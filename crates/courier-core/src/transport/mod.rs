//! Transport contract and request types.
//!
//! Concrete transports live in `courier-transport`.

pub mod contract;
pub mod request;

pub use contract::{ScopedError, Transport, run_scoped};
pub use request::{
    DEFAULT_BASE_URL, Endpoint, HttpMethod, InputFile, RequestData, RequestDescriptor,
    TimeoutOverrides, Timeouts, TransportResponse, USER_AGENT,
};
