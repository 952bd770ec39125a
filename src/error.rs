//! Error types for infobot.

use thiserror::Error;

/// Common error type for infobot.
#[derive(Error, Debug)]
pub enum InfobotError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The chat transport failed or went away.
    ///
    /// Never fatal: room workers log these and carry on with the state they have.
    #[error("transport error: {0}")]
    Transport(#[from] crate::bot::TransportError),

    /// Validation error for user supplied values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A room task panicked or was cancelled.
    #[error("room task failed: {0}")]
    Task(String),
}

/// Result type alias for infobot operations.
pub type Result<T> = std::result::Result<T, InfobotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::TransportError;

    #[test]
    fn test_config_error_display() {
        let err = InfobotError::Config("missing [bot] table".to_string());
        assert_eq!(err.to_string(), "configuration error: missing [bot] table");
    }

    #[test]
    fn test_validation_error_display() {
        let err = InfobotError::Validation("nick must not be empty".to_string());
        assert_eq!(err.to_string(), "validation error: nick must not be empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = InfobotError::NotFound("room xkcd".to_string());
        assert_eq!(err.to_string(), "room xkcd not found");
    }

    #[test]
    fn test_task_error_display() {
        let err = InfobotError::Task("task 7 panicked".to_string());
        assert_eq!(err.to_string(), "room task failed: task 7 panicked");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InfobotError = io_err.into();
        assert!(matches!(err, InfobotError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: InfobotError = TransportError::Timeout.into();
        assert!(matches!(err, InfobotError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: request timed out");
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(InfobotError::Config("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
