//! Conversation engine for the Sikkim Sage chat widget.
//!
//! Ties together the remote Gemini backend, session lifecycle, rule-based
//! intent classification, the append-only message store, and the response
//! formatter behind a single [`ChatController`].

pub mod backend;
pub mod classifier;
pub mod controller;
pub mod error;
pub mod format;
pub mod responses;
pub mod session;
pub mod store;

#[cfg(test)]
mod testutil;

pub use backend::{ChatBackend, GeminiClient, SessionHandle};
pub use classifier::{Intent, IntentClassifier};
pub use controller::ChatController;
pub use error::ChatError;
pub use format::{format, Block, Document, Inline};
pub use responses::ResponseBank;
pub use session::SessionManager;
pub use store::{FileSnapshotStore, MemorySnapshotStore, MessageStore, SnapshotStore};
