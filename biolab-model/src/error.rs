//! Error types for the `biolab-model` crate.

use thiserror::Error;

/// Errors that can occur when calling a generation model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A configuration validation error (missing key, empty model name, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A failure reported by the generation backend.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
