//! Error types for the test harness
//!
//! Only [`Error::ConfigMissing`] and [`Error::UnsupportedMethod`] are fatal
//! to a run. Every other error raised inside a test operation is caught by
//! the runner and counted as a failed test.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Service '{service}' not found in {source_name}")]
    ConfigMissing { service: String, source_name: String },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Request Errors ===
    #[error("Incompatible request method specified: {0}")]
    UnsupportedMethod(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Test Errors ===
    #[error("{0}")]
    TestAssertion(String),

    // === Process Errors ===
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config missing error for a service
    pub fn config_missing(service: &str, source_name: &str) -> Self {
        Self::ConfigMissing {
            service: service.to_string(),
            source_name: source_name.to_string(),
        }
    }

    /// Create a test assertion error
    pub fn assertion<S: Into<String>>(message: S) -> Self {
        Self::TestAssertion(message.into())
    }

    /// Create a command failed error
    pub fn command_failed(command: &str, reason: &str) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts the whole run rather than a single test
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigMissing { .. } | Error::UnsupportedMethod(_)
        )
    }

    /// Whether this error is an expectation failure raised by a test
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::TestAssertion(_))
    }
}

/// Fail the enclosing test with [`Error::TestAssertion`] unless `cond` holds
///
/// ```ignore
/// check!(outcome.status == 200, "Unexpected status code: {}", outcome.status);
/// ```
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        if !$cond {
            return Err($crate::Error::assertion(concat!(
                "Check failed: ",
                stringify!($cond)
            )));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::Error::assertion(format!($($arg)+)));
        }
    };
}

/// Fail the enclosing test unless both sides compare equal
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err($crate::Error::assertion(format!(
                        "Expected {:?}, got {:?}",
                        right, left
                    )));
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err($crate::Error::assertion(format!($($arg)+)));
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_is_ok(status: u16) -> Result<()> {
        check!(status == 200, "Unexpected status code: {}", status);
        Ok(())
    }

    fn same_token(actual: &str) -> Result<()> {
        check_eq!(actual, "abc");
        Ok(())
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::config_missing("svc", "test.config.json").is_fatal());
        assert!(Error::UnsupportedMethod("TRACE".into()).is_fatal());
        assert!(!Error::assertion("nope").is_fatal());
        assert!(!Error::Internal("boom".into()).is_fatal());
    }

    #[test]
    fn test_check_macro() {
        assert!(status_is_ok(200).is_ok());

        let err = status_is_ok(503).unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Unexpected status code: 503");
    }

    #[test]
    fn test_check_eq_macro() {
        assert!(same_token("abc").is_ok());

        let err = same_token("xyz").unwrap_err();
        assert_eq!(err.to_string(), "Expected \"abc\", got \"xyz\"");
    }

    #[test]
    fn test_config_missing_message() {
        let err = Error::config_missing("backend", "test.config.json");
        assert_eq!(
            err.to_string(),
            "Service 'backend' not found in test.config.json"
        );
    }
}
