//! # Courier Core
//!
//! The data and transport substrate of the Courier bot SDK.
//!
//! ## Layers
//!
//! ### Foundation Layer
//!
//! - **Fault taxonomy**: [`ContextError`], [`CallbackDataError`], [`TransportError`]
//! - **Update model**: [`Update`], [`Message`], [`Chat`], [`User`], [`CallbackQuery`]
//!
//! ### Framework Layer
//!
//! - **Execution context**: [`CallbackContext`] / [`DefaultContext`], one per
//!   dispatched update, job run or error
//! - **Keyed data**: [`KeyedStore`], [`DataStores`], [`SharedData`]
//! - **Collaborators**: [`Dispatcher`], [`Bot`], [`Persistence`], [`Job`], [`JobQueue`]
//! - **Callback data**: [`CallbackDataCache`]
//!
//! ### Transport Layer
//!
//! - **Contract**: [`Transport`], [`run_scoped`]
//! - **Requests**: [`RequestDescriptor`], [`RequestData`], [`Timeouts`],
//!   [`TimeoutOverrides`], [`TransportResponse`], [`Endpoint`]
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐  builds   ┌─────────────────┐  &mut   ┌───────────┐
//! │ Dispatcher │──────────▶│ CallbackContext │────────▶│  Handlers │
//! │ (stores)   │◀──────────│ (bound views)   │         └─────┬─────┘
//! └────────────┘  Arc<..>  └─────────────────┘               │
//!                                                            ▼
//!                                  ┌───────────┐   RequestDescriptor
//!                                  │ Transport │◀────────────────────
//!                                  └───────────┘
//! ```

pub mod foundation;
pub mod framework;
pub mod transport;

pub use foundation::{
    CallbackDataError, CallbackQuery, Chat, ContextError, ContextResult, Message, TransportError,
    TransportResult, Update, User,
};

pub use framework::{
    Bot, CallbackContext, CallbackDataCache, ContextValue, DataMap, DataStores, DefaultContext,
    Dispatcher, Job, JobQueue, KeyedStore, PatternMatch, Persistence, PersistenceInput,
    READ_ONLY_ATTRIBUTES, SharedData, UpdateQueue, shared,
};

pub use transport::{
    DEFAULT_BASE_URL, Endpoint, HttpMethod, InputFile, RequestData, RequestDescriptor,
    ScopedError, TimeoutOverrides, Timeouts, Transport, TransportResponse, USER_AGENT,
    run_scoped,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        Bot, CallbackContext, DataMap, DefaultContext, Dispatcher, SharedData,
    };
    pub use super::transport::{
        Endpoint, RequestData, RequestDescriptor, TimeoutOverrides, Transport, TransportResponse,
    };
}
