//! Configuration for the document and analysis pipelines.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration for the free-text document pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentPipelineConfig {
    /// Directory holding the markdown corpus.
    pub data_dir: PathBuf,
    /// Name of the active vector collection.
    pub collection: String,
    /// Maximum tokens per chunk.
    pub max_tokens: usize,
    /// Token overlap between consecutive chunks.
    pub overlap: usize,
    /// Number of chunks embedded per provider request.
    pub batch_size: usize,
    /// Number of nearest neighbors retrieved per query.
    pub top_k: usize,
    /// Maximum results assembled into the context block and cited.
    pub context_limit: usize,
    /// Upper bound on generated answer tokens.
    pub max_output_tokens: u32,
    /// Generation sampling temperature.
    pub temperature: f32,
}

impl Default for DocumentPipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            collection: "medical_documents".to_string(),
            max_tokens: 500,
            overlap: 50,
            batch_size: 10,
            top_k: 5,
            context_limit: 5,
            max_output_tokens: 1000,
            temperature: 0.1,
        }
    }
}

impl DocumentPipelineConfig {
    /// Create a new builder for constructing a [`DocumentPipelineConfig`].
    pub fn builder() -> DocumentPipelineConfigBuilder {
        DocumentPipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`DocumentPipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct DocumentPipelineConfigBuilder {
    config: DocumentPipelineConfig,
}

impl DocumentPipelineConfigBuilder {
    /// Set the corpus directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the active collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the maximum tokens per chunk.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the token overlap between consecutive chunks.
    pub fn overlap(mut self, overlap: usize) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Set the embedding batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the number of results retrieved per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the number of results assembled into the context block.
    pub fn context_limit(mut self, context_limit: usize) -> Self {
        self.config.context_limit = context_limit;
        self
    }

    /// Set the generated-answer token bound.
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.config.max_output_tokens = max_output_tokens;
        self
    }

    /// Set the generation temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Build the config, validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `overlap >= max_tokens`,
    /// `top_k == 0`, `batch_size == 0`, `context_limit == 0`, or the
    /// collection name is empty.
    pub fn build(self) -> Result<DocumentPipelineConfig> {
        if self.config.overlap >= self.config.max_tokens {
            return Err(RagError::ConfigError(format!(
                "overlap ({}) must be less than max_tokens ({})",
                self.config.overlap, self.config.max_tokens
            )));
        }
        validate_common(
            &self.config.collection,
            self.config.top_k,
            self.config.batch_size,
            self.config.context_limit,
        )?;
        Ok(self.config)
    }
}

/// Configuration for the structured analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisPipelineConfig {
    /// Directory holding the JSON record corpus.
    pub data_dir: PathBuf,
    /// Name of the active vector collection.
    pub collection: String,
    /// Number of records embedded per provider request.
    pub batch_size: usize,
    /// Number of nearest neighbors retrieved per query.
    pub top_k: usize,
    /// Maximum results assembled into the context block and cited.
    pub context_limit: usize,
    /// Upper bound on generated answer tokens.
    pub max_output_tokens: u32,
    /// Generation sampling temperature.
    pub temperature: f32,
}

impl Default for AnalysisPipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/compendium_data"),
            collection: "compendium_analyses".to_string(),
            batch_size: 50,
            top_k: 10,
            context_limit: 5,
            max_output_tokens: 1200,
            temperature: 0.1,
        }
    }
}

impl AnalysisPipelineConfig {
    /// Create a new builder for constructing an [`AnalysisPipelineConfig`].
    pub fn builder() -> AnalysisPipelineConfigBuilder {
        AnalysisPipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`AnalysisPipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipelineConfigBuilder {
    config: AnalysisPipelineConfig,
}

impl AnalysisPipelineConfigBuilder {
    /// Set the corpus directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the active collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the embedding batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the number of results retrieved per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the number of results assembled into the context block.
    pub fn context_limit(mut self, context_limit: usize) -> Self {
        self.config.context_limit = context_limit;
        self
    }

    /// Set the generated-answer token bound.
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.config.max_output_tokens = max_output_tokens;
        self
    }

    /// Set the generation temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Build the config, validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `top_k == 0`,
    /// `batch_size == 0`, `context_limit == 0`, or the collection name is
    /// empty.
    pub fn build(self) -> Result<AnalysisPipelineConfig> {
        validate_common(
            &self.config.collection,
            self.config.top_k,
            self.config.batch_size,
            self.config.context_limit,
        )?;
        Ok(self.config)
    }
}

fn validate_common(
    collection: &str,
    top_k: usize,
    batch_size: usize,
    context_limit: usize,
) -> Result<()> {
    if collection.is_empty() {
        return Err(RagError::ConfigError("collection name must not be empty".to_string()));
    }
    if top_k == 0 {
        return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
    }
    if batch_size == 0 {
        return Err(RagError::ConfigError("batch_size must be greater than zero".to_string()));
    }
    if context_limit == 0 {
        return Err(RagError::ConfigError("context_limit must be greater than zero".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policies_match_pipeline_contracts() {
        let docs = DocumentPipelineConfig::default();
        assert_eq!((docs.max_tokens, docs.overlap), (500, 50));
        assert_eq!((docs.batch_size, docs.top_k, docs.context_limit), (10, 5, 5));

        let analyses = AnalysisPipelineConfig::default();
        assert_eq!((analyses.batch_size, analyses.top_k, analyses.context_limit), (50, 10, 5));
    }

    #[test]
    fn rejects_overlap_not_less_than_max_tokens() {
        let err = DocumentPipelineConfig::builder().max_tokens(100).overlap(100).build();
        assert!(matches!(err, Err(RagError::ConfigError(_))));
    }

    #[test]
    fn rejects_zero_top_k_and_batch_size() {
        assert!(DocumentPipelineConfig::builder().top_k(0).build().is_err());
        assert!(AnalysisPipelineConfig::builder().batch_size(0).build().is_err());
        assert!(AnalysisPipelineConfig::builder().collection("").build().is_err());
    }
}
