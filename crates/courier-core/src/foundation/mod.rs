//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental types used throughout the SDK:
//! - Error types and the fault taxonomy
//! - The minimal update model the context binds against

pub mod error;
pub mod update;

pub use error::{CallbackDataError, ContextError, ContextResult, TransportError, TransportResult};
pub use update::{CallbackQuery, Chat, Message, Update, User};
