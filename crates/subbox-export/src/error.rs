//! Error types for the export pipeline.

use subbox_core::{CanonicalizationError, ClientType};
use thiserror::Error;

/// Failure while exporting a configuration.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No generator is registered for the requested client.
    #[error("no generator registered for client type: {0}")]
    NoGenerator(ClientType),

    /// The options file could not be read or parsed.
    #[error("invalid export options in {path}: {reason}")]
    Options {
        /// Path of the options file.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The generated config could not be canonicalized for its checksum.
    #[error("checksum computation failed: {0}")]
    Checksum(#[from] CanonicalizationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_client() {
        let err = ExportError::NoGenerator(ClientType::Xray);
        assert_eq!(err.to_string(), "no generator registered for client type: xray");
    }

    #[test]
    fn options_error_names_path() {
        let err = ExportError::Options {
            path: "opts.yaml".into(),
            reason: "bad indent".into(),
        };
        assert!(err.to_string().contains("opts.yaml"));
        assert!(err.to_string().contains("bad indent"));
    }
}
