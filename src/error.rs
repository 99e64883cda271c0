//! Error types for the Verity library.
//!
//! All fallible operations return [`VerityError`] through the [`Result`] alias.
//! Errors raised by external collaborators (article fetching, fact-check lookups)
//! have their own narrower types in [`crate::fetch`] and are converted at the
//! service boundary.
//!
//! # Examples
//!
//! ```
//! use verity::error::{Result, VerityError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VerityError::validation("Please enter a longer news statement."))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Verity operations.
#[derive(Error, Debug)]
pub enum VerityError {
    /// I/O errors (artifact files, corpora, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Analysis-related errors (tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model errors (untrained model, dimension mismatch, label convention)
    #[error("Model error: {0}")]
    Model(String),

    /// Persisted artifact errors (bad magic, version or checksum)
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Training pipeline errors
    #[error("Training error: {0}")]
    Training(String),

    /// Input did not meet the minimum richness bar
    #[error("Validation error: {0}")]
    Validation(String),

    /// Article extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] crate::fetch::FetchError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with VerityError.
pub type Result<T> = std::result::Result<T, VerityError>;

impl VerityError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        VerityError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        VerityError::Config(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        VerityError::Model(msg.into())
    }

    /// Create a new artifact error.
    pub fn artifact<S: Into<String>>(msg: S) -> Self {
        VerityError::Artifact(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        VerityError::Training(msg.into())
    }

    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        VerityError::Validation(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        VerityError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        VerityError::Other(msg.into())
    }
}

impl From<bincode::Error> for VerityError {
    fn from(err: bincode::Error) -> Self {
        VerityError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = VerityError::model("Test model error");
        assert_eq!(error.to_string(), "Model error: Test model error");

        let error = VerityError::validation("too short");
        assert_eq!(error.to_string(), "Validation error: too short");

        let error = VerityError::artifact("bad magic");
        assert_eq!(error.to_string(), "Artifact error: bad magic");
    }

    #[test]
    fn test_fetch_timeout_is_an_extraction_error() {
        let error = VerityError::from(crate::fetch::FetchError::timeout("no response"));
        match &error {
            VerityError::Extraction(e) => {
                assert_eq!(e.kind, crate::fetch::FetchErrorKind::Timeout);
            }
            other => panic!("Expected extraction error, got {other:?}"),
        }
        assert!(error.to_string().starts_with("Extraction error: "));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let verity_error = VerityError::from(io_error);

        match verity_error {
            VerityError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
