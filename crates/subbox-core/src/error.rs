//! # Error Types
//!
//! Errors shared across the subbox workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Validation outcomes are deliberately absent here: a configuration that
//! fails validation is a *result*, reported through `ValidationResult` in
//! `subbox-schema`, never an error value.

use thiserror::Error;

/// Top-level error type for subbox core operations.
#[derive(Error, Debug)]
pub enum SubboxError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The client type string is not one of the supported clients.
    #[error("unsupported client type: {0}")]
    UnsupportedClient(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be converted into a JSON value tree.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// NaN and infinities have no JSON representation.
    #[error("non-finite float {0} cannot be canonicalized")]
    NonFiniteFloat(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_client_display() {
        let err = SubboxError::UnsupportedClient("surge".to_string());
        assert_eq!(err.to_string(), "unsupported client type: surge");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SubboxError = io.into();
        assert!(err.to_string().starts_with("io error:"));
    }
}
