//! Shared test doubles for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use biolab_rag::embedding::EmbeddingProvider;
use biolab_rag::error::{RagError, Result};

/// Deterministic hash-based embedding provider.
///
/// Embeddings depend only on the text content, so retrieval results are
/// reproducible across runs. Batch calls are counted, and a failure marker
/// makes any batch containing it fail as a unit.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    fail_marker: Option<String>,
    batch_calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, fail_marker: None, batch_calls: AtomicUsize::new(0) }
    }

    /// Fail any batch whose texts contain `marker`.
    pub fn failing_on(dimensions: usize, marker: impl Into<String>) -> Self {
        Self { dimensions, fail_marker: Some(marker.into()), batch_calls: AtomicUsize::new(0) }
    }

    /// Number of `embed_batch` calls received so far.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, value) in embedding.iter_mut().enumerate() {
            *value = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if texts.iter().any(|text| text.contains(marker.as_str())) {
                return Err(RagError::EmbeddingError {
                    provider: "mock".into(),
                    message: format!("batch contains failure marker '{marker}'"),
                });
            }
        }
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
