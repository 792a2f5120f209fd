use thiserror::Error;

/// Top-level error type for the Sage system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for SageError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SageError {
    fn from(err: toml::de::Error) -> Self {
        SageError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SageError {
    fn from(err: toml::ser::Error) -> Self {
        SageError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SageError {
    fn from(err: serde_json::Error) -> Self {
        SageError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Sage operations.
pub type Result<T> = std::result::Result<T, SageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SageError::Config("missing api key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing api key");

        let err = SageError::Session("backend unreachable".to_string());
        assert_eq!(err.to_string(), "Session error: backend unreachable");

        let err = SageError::Send("timed out".to_string());
        assert_eq!(err.to_string(), "Send error: timed out");

        let err = SageError::Voice("microphone unavailable".to_string());
        assert_eq!(err.to_string(), "Voice error: microphone unavailable");

        let err = SageError::Snapshot("write failed".to_string());
        assert_eq!(err.to_string(), "Snapshot error: write failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sage_err: SageError = io_err.into();
        assert!(matches!(sage_err, SageError::Io(_)));
        assert!(sage_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let sage_err: SageError = err.unwrap_err().into();
        assert!(matches!(sage_err, SageError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let sage_err: SageError = err.unwrap_err().into();
        assert!(matches!(sage_err, SageError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = SageError::Config("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Config"));
        assert!(debug_str.contains("test debug"));
    }
}
