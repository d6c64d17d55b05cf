//! In-memory vector store using cosine distance.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock`. It is the reference backend for development and
//! tests; production deployments plug a durable backend into the same
//! [`VectorStore`] trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};
use crate::vectorstore::{Entry, QueryMatch, VectorStore};

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    entries: HashMap<String, Entry>,
}

/// An in-memory [`VectorStore`] using cosine distance for search.
///
/// Distances are `1 − cos(a, b)`: 0 for identical directions, up to 2 for
/// opposite directions. Zero-magnitude vectors are treated as orthogonal
/// to everything (distance 1).
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(name: &str) -> RagError {
        RagError::VectorStoreError {
            backend: "InMemory".to_string(),
            message: format!("collection '{name}' does not exist"),
        }
    }
}

/// Cosine distance between two vectors: `1 − (a·b) / (‖a‖‖b‖)`.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Collection { dimensions, entries: HashMap::new() });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn add(&self, collection: &str, entries: &[Entry]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;

        // Validate the whole batch before storing any of it.
        for entry in entries {
            if store.entries.contains_key(&entry.id) {
                return Err(RagError::DuplicateId {
                    collection: collection.to_string(),
                    id: entry.id.clone(),
                });
            }
            if entry.embedding.len() != store.dimensions {
                return Err(RagError::DimensionMismatch {
                    collection: collection.to_string(),
                    expected: store.dimensions,
                    actual: entry.embedding.len(),
                });
            }
        }
        for entry in entries {
            store.entries.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map(|c| c.entries.len()).unwrap_or(0))
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryMatch>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut matches: Vec<QueryMatch> = store
            .entries
            .values()
            .map(|entry| QueryMatch {
                id: entry.id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                distance: cosine_distance(&entry.embedding, embedding),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn metadata(&self, collection: &str) -> Result<Vec<HashMap<String, String>>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.entries.values().map(|entry| entry.metadata.clone()).collect())
            .unwrap_or_default())
    }

    async fn promote(&self, staging: &str, active: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let promoted = collections.remove(staging).ok_or_else(|| Self::missing(staging))?;
        collections.insert(active.to_string(), promoted);
        Ok(())
    }
}
