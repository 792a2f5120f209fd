//! Listen state machine with thread-safe transitions.
//!
//! The microphone toggle is a two-state lifecycle:
//! - Idle -> Listening (start listening)
//! - Listening -> Idle (transcript delivered, error, or user stop)
//!
//! Self-transitions are invalid; a second "start" while listening is a
//! stop, handled by the adapter, not a re-entry.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::VoiceError;

/// Operational state of the voice input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenState {
    /// Microphone off. Ready to start.
    Idle,
    /// Actively capturing a single utterance.
    Listening,
}

impl fmt::Display for ListenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenState::Idle => write!(f, "Idle"),
            ListenState::Listening => write!(f, "Listening"),
        }
    }
}

impl ListenState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &ListenState) -> bool {
        matches!(
            (self, target),
            (ListenState::Idle, ListenState::Listening)
                | (ListenState::Listening, ListenState::Idle)
        )
    }
}

/// Thread-safe state machine for the listen lifecycle.
///
/// Clones share the same underlying state. All transitions are validated
/// before being applied.
#[derive(Debug, Clone)]
pub struct ListenStateMachine {
    state: Arc<Mutex<ListenState>>,
}

impl Default for ListenStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenStateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ListenState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> ListenState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: ListenState) -> Result<(), VoiceError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Listen state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(VoiceError::InvalidTransition(format!(
                "{} -> {}",
                *state, target
            )))
        }
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if *state != ListenState::Idle {
            tracing::warn!("Listen state machine reset to Idle from {}", *state);
        }
        *state = ListenState::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================
