//! Error types for the conversation controller.

use sage_core::error::SageError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("send error: {0}")]
    Send(String),
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("no active session")]
    NoSession,
    #[error("storage error: {0}")]
    Storage(String),
}

impl ChatError {
    /// Whether the error is a fatal configuration problem rather than a
    /// transient backend failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ChatError::Configuration(_))
    }
}

impl From<SageError> for ChatError {
    fn from(err: SageError) -> Self {
        match err {
            SageError::Config(msg) => ChatError::Configuration(msg),
            SageError::Session(msg) => ChatError::Connection(msg),
            SageError::Send(msg) => ChatError::Send(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Configuration("missing key".to_string());
        assert_eq!(err.to_string(), "configuration error: missing key");

        let err = ChatError::Connection("unreachable".to_string());
        assert_eq!(err.to_string(), "connection error: unreachable");

        let err = ChatError::Send("timed out".to_string());
        assert_eq!(err.to_string(), "send error: timed out");

        let err = ChatError::EmptyMessage;
        assert_eq!(err.to_string(), "message cannot be empty");

        let err = ChatError::NoSession;
        assert_eq!(err.to_string(), "no active session");

        let err = ChatError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn test_is_configuration() {
        assert!(ChatError::Configuration("x".into()).is_configuration());
        assert!(!ChatError::Connection("x".into()).is_configuration());
        assert!(!ChatError::EmptyMessage.is_configuration());
    }

    #[test]
    fn test_from_sage_error_config() {
        let err: ChatError = SageError::Config("no key".to_string()).into();
        assert!(matches!(err, ChatError::Configuration(_)));
        assert!(err.to_string().contains("no key"));
    }

    #[test]
    fn test_from_sage_error_session() {
        let err: ChatError = SageError::Session("refused".to_string()).into();
        assert!(matches!(err, ChatError::Connection(_)));
    }

    #[test]
    fn test_from_sage_error_send() {
        let err: ChatError = SageError::Send("dropped".to_string()).into();
        assert!(matches!(err, ChatError::Send(_)));
    }

    #[test]
    fn test_from_sage_error_other() {
        let err: ChatError = SageError::Serialization("bad json".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("bad json"));
    }
}
