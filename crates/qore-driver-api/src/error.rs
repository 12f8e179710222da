// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for driver operations
//!
//! Drivers map their native failures to these variants so callers (and
//! wrapping layers) can handle them uniformly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all driver operations
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DriverError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("No suitable driver found for {url}")]
    DriverNotFound { url: String },

    #[error("Driver registration failed: {message}")]
    RegistrationFailed { message: String },

    #[error("Query execution error: {message}")]
    ExecutionError { message: String },

    #[error("Object is closed: {message}")]
    Closed { message: String },

    #[error("Feature not supported: {message}")]
    NotSupported { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DriverError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: msg.into() }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument { message: msg.into() }
    }

    pub fn driver_not_found(url: impl Into<String>) -> Self {
        Self::DriverNotFound { url: url.into() }
    }

    pub fn registration_failed(msg: impl Into<String>) -> Self {
        Self::RegistrationFailed { message: msg.into() }
    }

    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError { message: msg.into() }
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed { message: msg.into() }
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported { message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal { message: msg.into() }
    }
}

/// Result type alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DriverError::invalid_argument("perf-:x is not an instrumentable URL");
        assert_eq!(
            err.to_string(),
            "Invalid argument: perf-:x is not an instrumentable URL"
        );

        let err = DriverError::driver_not_found("nosuch://host");
        assert_eq!(err.to_string(), "No suitable driver found for nosuch://host");
    }

    #[test]
    fn test_error_serializes_with_variant_tag() {
        let json = serde_json::to_string(&DriverError::closed("statement")).unwrap();
        assert_eq!(json, r#"{"Closed":{"message":"statement"}}"#);
    }
}
