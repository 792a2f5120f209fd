//! Voice input for the Sikkim Sage chat widget.
//!
//! A validated listen state machine plus an adapter that turns a platform
//! speech recognizer into transcript events on a channel.

pub mod adapter;
pub mod error;
pub mod state;

pub use adapter::{SpeechRecognizer, TranscriptEvent, UnsupportedRecognizer, VoiceInputAdapter};
pub use error::VoiceError;
pub use state::{ListenState, ListenStateMachine};
