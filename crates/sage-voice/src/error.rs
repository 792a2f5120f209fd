//! Error types for voice input.

use sage_core::error::SageError;

/// Errors from the voice input layer.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("speech recognition is not available on this platform")]
    CapabilityUnavailable,
    #[error("recognition error: {0}")]
    Recognition(String),
    #[error("invalid listen state transition: {0}")]
    InvalidTransition(String),
}

impl From<VoiceError> for SageError {
    fn from(err: VoiceError) -> Self {
        SageError::Voice(err.to_string())
    }
}
