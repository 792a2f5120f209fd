//! Shared types, configuration, events, and errors for the Sikkim Sage
//! travel assistant.
//!
//! The chat controller (`sage-chat`) and voice input adapter (`sage-voice`)
//! build on the primitives defined here.

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::SageConfig;
pub use error::{Result, SageError};
pub use events::UiEvent;
pub use types::{Message, NavigationTarget, Sender};
