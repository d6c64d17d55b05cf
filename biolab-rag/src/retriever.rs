//! Query-side retrieval: embed the query, search the store, score results.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::embedding::EmbeddingProvider;
use crate::vectorstore::VectorStore;

/// A retrieved entry paired with its similarity score.
///
/// `score = 1 − distance` under the store's cosine-distance metric, so
/// higher means more relevant. For the cosine metric the score equals the
/// cosine similarity and lies in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct Retrieved {
    /// The stored entry id.
    pub id: String,
    /// The stored text.
    pub document: String,
    /// The stored metadata.
    pub metadata: HashMap<String, String>,
    /// Similarity score (higher is more relevant).
    pub score: f32,
}

/// Retrieves the nearest collection entries for a natural-language query.
///
/// The query is embedded exactly once per call. Any failure — embedding,
/// absent collection, backend error — degrades to an empty result: an
/// empty return means "no grounding available", never a hard failure.
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over the named collection.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self { embedding_provider, vector_store, collection: collection.into(), top_k }
    }

    /// Return the top entries for `query`, best match first.
    pub async fn retrieve(&self, query: &str) -> Vec<Retrieved> {
        let embedding = match self.embedding_provider.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, returning no results");
                return Vec::new();
            }
        };

        let matches =
            match self.vector_store.query(&self.collection, &embedding, self.top_k).await {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(
                        collection = %self.collection,
                        error = %e,
                        "vector search failed, returning no results"
                    );
                    return Vec::new();
                }
            };

        debug!(collection = %self.collection, results = matches.len(), "retrieval completed");

        matches
            .into_iter()
            .map(|m| Retrieved {
                id: m.id,
                document: m.document,
                metadata: m.metadata,
                score: 1.0 - m.distance,
            })
            .collect()
    }
}
