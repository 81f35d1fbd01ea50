//! Framework layer - Per-event state and its collaborators.
//!
//! This module contains:
//! - The execution context handed to handlers
//! - Keyed data stores owned by the dispatcher
//! - The callback data cache
//! - Contracts for the dispatcher, bot, jobs and persistence

pub mod callback_data;
pub mod context;
pub mod dispatcher;
pub mod store;

pub use callback_data::CallbackDataCache;
pub use context::{
    CallbackContext, ContextValue, DefaultContext, PatternMatch, READ_ONLY_ATTRIBUTES,
};
pub use dispatcher::{
    Bot, Dispatcher, Job, JobQueue, Persistence, PersistenceInput, UpdateQueue,
};
pub use store::{DataMap, DataStores, KeyedStore, SharedData, shared};
