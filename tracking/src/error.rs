//! Tracking error types
//!
//! Structured errors for every fallible ledger, dataset, parser and session
//! operation. Non-fatal conditions (corrupt store, failed save) are logged
//! where they happen and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tracking operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Errors that can occur while tracking parser verdicts
#[derive(Error, Debug)]
pub enum TrackingError {
    /// Dataset file could not be read
    #[error("Error loading dataset {path}: {source}")]
    DatasetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parser collaborator failed for a title
    #[error("Parser failed on '{title}': {message}")]
    ParserFailed { title: String, message: String },

    /// Invalid session phase transition
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackingError {
    /// Create a dataset unreadable error
    pub fn dataset(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DatasetUnreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a parser failure error
    pub fn parser(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParserFailed {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackingError::parser("Movie.2020.720p", "exit status 1");
        assert_eq!(
            err.to_string(),
            "Parser failed on 'Movie.2020.720p': exit status 1"
        );

        let err = TrackingError::transition("selecting", "recording");
        assert!(err.to_string().contains("selecting"));
        assert!(err.to_string().contains("recording"));
    }

    #[test]
    fn test_dataset_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = TrackingError::dataset("titles.txt", io);
        let message = err.to_string();
        assert!(message.starts_with("Error loading dataset titles.txt"));
        assert!(err.source().is_some());
    }
}
