//! Voice input adapter with toggle semantics.
//!
//! Wraps a platform [`SpeechRecognizer`] behind the microphone toggle:
//! pressing the toggle while idle starts a single-utterance capture,
//! pressing it while listening stops the capture. Results and failures are
//! delivered as [`TranscriptEvent`]s on a channel so the controller consumes
//! them from the same queue as typed submissions. A final transcript is
//! forwarded verbatim; any recognition error resets the state to Idle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::VoiceError;
use crate::state::{ListenState, ListenStateMachine};

// =============================================================================
// SpeechRecognizer
// =============================================================================

/// Platform speech capture for one utterance at a time.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether speech capture is available on this platform.
    fn is_available(&self) -> bool;

    /// Capture one utterance and return the final transcript.
    async fn recognize(&self) -> Result<String, VoiceError>;
}

/// Recognizer for platforms without speech capture.
///
/// Always unavailable; the adapter reports the missing capability without
/// crashing or changing state.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn recognize(&self) -> Result<String, VoiceError> {
        Err(VoiceError::CapabilityUnavailable)
    }
}

// =============================================================================
// TranscriptEvent
// =============================================================================

/// Outcome of one listen session, delivered on the adapter's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Final transcript of the captured utterance.
    Transcript(String),
    /// Recognition failed; the adapter has already reset to Idle.
    Error(String),
}

// =============================================================================
// VoiceInputAdapter
// =============================================================================

/// Microphone toggle over a [`SpeechRecognizer`].
///
/// Clones share the same listen state and generation counter, so a clone
/// handed to a background task observes stops made through the original.
#[derive(Clone)]
pub struct VoiceInputAdapter {
    recognizer: Arc<dyn SpeechRecognizer>,
    state: ListenStateMachine,
    events: mpsc::UnboundedSender<TranscriptEvent>,
    generation: Arc<AtomicU64>,
}

impl VoiceInputAdapter {
    /// Create an adapter delivering transcript events to `events`.
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        events: mpsc::UnboundedSender<TranscriptEvent>,
    ) -> Self {
        Self {
            recognizer,
            state: ListenStateMachine::new(),
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current listen state.
    pub fn state(&self) -> ListenState {
        self.state.current()
    }

    /// Whether a capture is in progress.
    pub fn is_listening(&self) -> bool {
        self.state.current() == ListenState::Listening
    }

    /// Press the microphone toggle.
    ///
    /// Idle starts a capture; Listening stops the one in progress. Returns
    /// the state after the press. Starting on a platform without speech
    /// capture fails with `CapabilityUnavailable` and leaves state Idle.
    pub fn toggle(&self) -> Result<ListenState, VoiceError> {
        match self.state.current() {
            ListenState::Listening => {
                self.stop();
                Ok(ListenState::Idle)
            }
            ListenState::Idle => {
                self.start()?;
                Ok(ListenState::Listening)
            }
        }
    }

    /// Start a capture. The transcript (or error) arrives as an event.
    /// Only reachable through `toggle`, which owns the press semantics.
    fn start(&self) -> Result<(), VoiceError> {
        if !self.recognizer.is_available() {
            return Err(VoiceError::CapabilityUnavailable);
        }
        self.state.transition(ListenState::Listening)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let adapter = self.clone();
        tokio::spawn(async move {
            let outcome = adapter.recognizer.recognize().await;
            // A stop (or a newer start) bumped the generation; this
            // capture's result is stale and must not be delivered.
            if adapter.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale capture result");
                return;
            }
            adapter.state.reset();
            let event = match outcome {
                Ok(transcript) => {
                    tracing::debug!(len = transcript.len(), "Transcript captured");
                    TranscriptEvent::Transcript(transcript)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Speech recognition failed");
                    TranscriptEvent::Error(e.to_string())
                }
            };
            let _ = adapter.events.send(event);
        });
        Ok(())
    }

    /// Stop the capture in progress. Idempotent when already idle.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.reset();
    }
}

// =============================================================================
// Tests
// =============================================================================
