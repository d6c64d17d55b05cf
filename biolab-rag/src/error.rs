//! Error types for the `biolab-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An entry id collided with one already stored in the collection.
    #[error("Duplicate id '{id}' in collection '{collection}'")]
    DuplicateId {
        /// The collection that rejected the entry.
        collection: String,
        /// The colliding id.
        id: String,
    },

    /// An embedding did not match the collection's dimensionality.
    #[error("Dimension mismatch in collection '{collection}': expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The collection that rejected the entry.
        collection: String,
        /// The dimensionality the collection was created with.
        expected: usize,
        /// The dimensionality of the offending embedding.
        actual: usize,
    },

    /// An error occurred during text chunking.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An error propagated from the generation model.
    #[error(transparent)]
    ModelError(#[from] biolab_model::ModelError),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
