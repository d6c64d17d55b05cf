//! Vector store trait for named collections of embedded entries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One persisted collection entry.
///
/// The metadata map mirrors the source chunk or analysis-record fields
/// verbatim (empty strings for absent optional fields, never missing keys),
/// so the original record can be reconstructed from it exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique id within the collection.
    pub id: String,
    /// The embedding vector; its length must equal the collection
    /// dimensionality.
    pub embedding: Vec<f32>,
    /// The raw text that was embedded.
    pub document: String,
    /// Source fields, stored losslessly.
    pub metadata: HashMap<String, String>,
}

/// A nearest-neighbor match returned by [`VectorStore::query`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// The matched entry's id.
    pub id: String,
    /// The matched entry's stored text.
    pub document: String,
    /// The matched entry's metadata.
    pub metadata: HashMap<String, String>,
    /// Cosine distance to the query embedding (lower is closer).
    pub distance: f32,
}

/// A storage backend for named collections of embeddings.
///
/// The store exclusively owns persisted vectors and metadata. Collections
/// are addressed by name; [`promote`](VectorStore::promote) supports the
/// two-phase rebuild protocol (ingest into a staging collection, then swap
/// it over the active name).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection for embeddings of the given dimensionality.
    /// No-op if the collection already exists (its dimensionality is kept).
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data. No-op if absent.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Append entries to a collection.
    ///
    /// # Errors
    ///
    /// - [`RagError::DuplicateId`](crate::RagError::DuplicateId) if an
    ///   entry id is already present — ids are never silently overwritten.
    /// - [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    ///   if an embedding's length differs from the collection
    ///   dimensionality.
    ///
    /// No entry of the batch is stored when validation fails.
    async fn add(&self, collection: &str, entries: &[Entry]) -> Result<()>;

    /// Number of entries in a collection; 0 for an absent collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Up to `k` nearest entries by ascending cosine distance.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryMatch>>;

    /// All stored metadata maps; empty for an absent collection.
    async fn metadata(&self, collection: &str) -> Result<Vec<HashMap<String, String>>>;

    /// Replace `active` with the contents of `staging` in one step.
    ///
    /// After the call, `staging` no longer exists and `active` holds what
    /// `staging` held. Fails if `staging` is absent.
    async fn promote(&self, staging: &str, active: &str) -> Result<()>;
}
