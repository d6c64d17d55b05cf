//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that converts text into fixed-length numeric vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. [`embed_batch`](EmbeddingProvider::embed_batch) is
/// order-preserving: output vector *i* embeds input text *i*, and the two
/// sequences have the same length. The default implementation calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with native
/// batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    ///
    /// Every vector returned by [`embed`](EmbeddingProvider::embed) and
    /// [`embed_batch`](EmbeddingProvider::embed_batch) has this length.
    fn dimensions(&self) -> usize;
}
