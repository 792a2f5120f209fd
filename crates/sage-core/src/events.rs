use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::NavigationTarget;

/// Domain events emitted by the conversation controller and voice adapter.
///
/// Events are emitted after state changes and consumed by the host UI on the
/// same single-threaded event queue as user input. Emission is best-effort:
/// a closed channel is ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UiEvent {
    // =========================================================================
    // Conversation events
    // =========================================================================
    /// A message was appended to the conversation log.
    MessageAppended { message_id: Uuid },

    /// A remote request is in flight; show the loading indicator.
    ReplyPending,

    /// The remote request finished (reply or error message appended).
    ReplyArrived,

    /// The remote session was created and is ready for sends.
    SessionReady,

    /// Session creation failed; the controller is in degraded local mode.
    SessionFailed { reason: String },

    // =========================================================================
    // Voice events
    // =========================================================================
    /// The voice adapter started listening.
    ListeningStarted,

    /// The voice adapter stopped listening (result, error, or explicit stop).
    ListeningStopped,

    /// A final transcript was received and submitted as user input.
    TranscriptReceived { text: String },

    // =========================================================================
    // Host navigation
    // =========================================================================
    /// The widget requests navigation to a fixed host destination.
    NavigateRequested { destination: NavigationTarget },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_round_trip() {
        let event = UiEvent::NavigateRequested {
            destination: NavigationTarget::MonasteryMap,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: UiEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            UiEvent::NavigateRequested {
                destination: NavigationTarget::MonasteryMap
            }
        ));
    }

    #[test]
    fn test_session_failed_carries_reason() {
        let event = UiEvent::SessionFailed {
            reason: "backend unreachable".to_string(),
        };
        match event {
            UiEvent::SessionFailed { reason } => assert_eq!(reason, "backend unreachable"),
            _ => panic!("expected SessionFailed"),
        }
    }

    #[test]
    fn test_event_is_cloneable() {
        let event = UiEvent::ReplyPending;
        let copy = event.clone();
        assert!(matches!(copy, UiEvent::ReplyPending));
    }
}
