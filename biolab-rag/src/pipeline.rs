//! Pipeline orchestrators wiring corpus ingestion, embedding, storage,
//! retrieval, and synthesis into `build()` and `ask()` entry points.
//!
//! Two pipelines run the same workflow over different corpora:
//! [`DocumentPipeline`] over free-text markdown documents, and
//! [`AnalysisPipeline`] over structured laboratory records.
//!
//! Rebuilds follow a two-phase protocol: entries are ingested into a
//! staging collection, which is promoted over the active name only once it
//! verifiably holds data. Readers keep seeing the previous collection
//! until the promote, and a failed build leaves it untouched. A rebuild is
//! still a single-writer maintenance operation; the core does not lock out
//! concurrent rebuilds of the same collection.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use biolab_model::ChatModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunking::TokenChunker;
use crate::config::{AnalysisPipelineConfig, DocumentPipelineConfig};
use crate::corpus;
use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::retriever::Retriever;
use crate::synthesizer::{AnalysisSource, DocumentSource, QueryResponse, Synthesizer};
use crate::vectorstore::{Entry, VectorStore};

/// Outcome of a collection build.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of entries indexed in the collection.
    pub indexed: usize,
    /// Number of embedding batches that failed and were skipped.
    pub batches_skipped: usize,
}

/// One corpus unit ready for indexing: id, embeddable text, and metadata.
struct IndexUnit {
    id: String,
    text: String,
    metadata: HashMap<String, String>,
}

/// Embed `units` in batches and ingest them into a staging collection,
/// then promote it over `collection`.
///
/// A batch whose embedding call fails is logged and skipped; the build
/// continues with a smaller corpus. A build that indexes nothing deletes
/// the staging collection and fails without touching the active one.
async fn build_collection(
    vector_store: &Arc<dyn VectorStore>,
    embedding_provider: &Arc<dyn EmbeddingProvider>,
    collection: &str,
    batch_size: usize,
    units: &[IndexUnit],
) -> Result<BuildReport> {
    let staging = format!("{collection}__staging");
    vector_store.delete_collection(&staging).await?;
    vector_store.create_collection(&staging, embedding_provider.dimensions()).await?;

    let mut report = BuildReport::default();
    for batch in units.chunks(batch_size) {
        let texts: Vec<&str> = batch.iter().map(|unit| unit.text.as_str()).collect();
        let embeddings = match embedding_provider.embed_batch(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(collection, batch_len = batch.len(), error = %e, "skipping failed batch");
                report.batches_skipped += 1;
                continue;
            }
        };
        if embeddings.len() != batch.len() {
            warn!(
                collection,
                expected = batch.len(),
                got = embeddings.len(),
                "provider returned a short batch, skipping it"
            );
            report.batches_skipped += 1;
            continue;
        }

        let entries: Vec<Entry> = batch
            .iter()
            .zip(embeddings)
            .map(|(unit, embedding)| Entry {
                id: unit.id.clone(),
                embedding,
                document: unit.text.clone(),
                metadata: unit.metadata.clone(),
            })
            .collect();
        vector_store.add(&staging, &entries).await?;
        report.indexed += entries.len();
        debug!(collection, added = entries.len(), "batch indexed");
    }

    if report.indexed == 0 {
        vector_store.delete_collection(&staging).await?;
        return Err(RagError::PipelineError(format!(
            "build produced no entries for collection '{collection}'"
        )));
    }

    vector_store.promote(&staging, collection).await?;
    info!(
        collection,
        indexed = report.indexed,
        batches_skipped = report.batches_skipped,
        "collection rebuilt"
    );
    Ok(report)
}

// ── Document pipeline ──────────────────────────────────────────────

/// A source file summary: one markdown document and its indexed chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSummary {
    /// The source file name.
    pub filename: String,
    /// The document title.
    pub title: String,
    /// Number of chunks indexed for this file.
    pub chunk_count: usize,
}

/// The RAG pipeline over free-text markdown documents.
///
/// Construct via [`DocumentPipeline::builder()`].
pub struct DocumentPipeline {
    config: DocumentPipelineConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: TokenChunker,
    retriever: Retriever,
    synthesizer: Synthesizer,
}

impl DocumentPipeline {
    /// Create a new [`DocumentPipelineBuilder`].
    pub fn builder() -> DocumentPipelineBuilder {
        DocumentPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &DocumentPipelineConfig {
        &self.config
    }

    /// Number of entries in the active collection (0 before the first
    /// build).
    pub async fn count(&self) -> Result<usize> {
        self.vector_store.count(&self.config.collection).await
    }

    /// Build the collection if it is empty; no-op otherwise.
    pub async fn build(&self) -> Result<BuildReport> {
        let existing = self.count().await?;
        if existing > 0 {
            info!(
                collection = %self.config.collection,
                count = existing,
                "collection already populated, skipping build"
            );
            return Ok(BuildReport { indexed: existing, batches_skipped: 0 });
        }
        self.rebuild().await
    }

    /// Rebuild the collection from the corpus directory, replacing the
    /// active contents only once the new build holds data.
    pub async fn rebuild(&self) -> Result<BuildReport> {
        let documents = corpus::load_documents(&self.config.data_dir);
        if documents.is_empty() {
            return Err(RagError::PipelineError(format!(
                "no documents found in '{}'",
                self.config.data_dir.display()
            )));
        }

        let mut units = Vec::new();
        for document in &documents {
            let pieces = match self.chunker.chunk(&document.text) {
                Ok(pieces) => pieces,
                Err(e) => {
                    warn!(file = %document.filename, error = %e, "skipping unchunkable document");
                    continue;
                }
            };
            for (index, content) in pieces.into_iter().enumerate() {
                let chunk = Chunk {
                    content,
                    filename: document.filename.clone(),
                    title: document.title.clone(),
                    chunk_id: format!("{}_{index}", document.filename),
                };
                units.push(IndexUnit {
                    id: chunk.chunk_id.clone(),
                    metadata: chunk.metadata(),
                    text: chunk.content,
                });
            }
        }
        info!(documents = documents.len(), chunks = units.len(), "document corpus chunked");

        build_collection(
            &self.vector_store,
            &self.embedding_provider,
            &self.config.collection,
            self.config.batch_size,
            &units,
        )
        .await
    }

    /// Answer a question from the document collection.
    ///
    /// Never fails: retrieval and generation errors degrade into the
    /// response per the pipeline error contracts.
    pub async fn ask(&self, question: &str) -> QueryResponse<DocumentSource> {
        info!(question, "document pipeline query");
        let results = self.retriever.retrieve(question).await;
        let (answer, sources) =
            self.synthesizer.documents(question, &results, self.config.context_limit).await;
        QueryResponse { answer, sources, query: question.to_string() }
    }

    /// Summarize the indexed source files: one entry per filename with its
    /// title and chunk count, sorted by filename.
    pub async fn sources(&self) -> Result<Vec<SourceSummary>> {
        let metadata = self.vector_store.metadata(&self.config.collection).await?;
        let mut by_file: BTreeMap<String, SourceSummary> = BTreeMap::new();
        for entry in metadata {
            let filename = entry.get("filename").cloned().unwrap_or_default();
            let summary = by_file.entry(filename.clone()).or_insert_with(|| SourceSummary {
                filename,
                title: entry.get("title").cloned().unwrap_or_default(),
                chunk_count: 0,
            });
            summary.chunk_count += 1;
        }
        Ok(by_file.into_values().collect())
    }
}

/// Builder for constructing a [`DocumentPipeline`].
///
/// All components are required. Call
/// [`build()`](DocumentPipelineBuilder::build) to validate and produce the
/// pipeline.
#[derive(Default)]
pub struct DocumentPipelineBuilder {
    config: Option<DocumentPipelineConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chat_model: Option<Arc<dyn ChatModel>>,
}

impl DocumentPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: DocumentPipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation model.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Build the [`DocumentPipeline`], validating that all components are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a component is missing, and
    /// propagates chunker construction failures.
    pub fn build(self) -> Result<DocumentPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| RagError::ConfigError("chat_model is required".to_string()))?;

        let chunker = TokenChunker::new(config.max_tokens, config.overlap)?;
        let retriever = Retriever::new(
            Arc::clone(&embedding_provider),
            Arc::clone(&vector_store),
            config.collection.clone(),
            config.top_k,
        );
        let synthesizer =
            Synthesizer::new(chat_model, config.max_output_tokens, config.temperature);

        Ok(DocumentPipeline {
            config,
            embedding_provider,
            vector_store,
            chunker,
            retriever,
            synthesizer,
        })
    }
}

// ── Analysis pipeline ──────────────────────────────────────────────

/// The RAG pipeline over structured laboratory analysis records.
///
/// Construct via [`AnalysisPipeline::builder()`].
pub struct AnalysisPipeline {
    config: AnalysisPipelineConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    retriever: Retriever,
    synthesizer: Synthesizer,
}

impl AnalysisPipeline {
    /// Create a new [`AnalysisPipelineBuilder`].
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &AnalysisPipelineConfig {
        &self.config
    }

    /// Number of entries in the active collection (0 before the first
    /// build).
    pub async fn count(&self) -> Result<usize> {
        self.vector_store.count(&self.config.collection).await
    }

    /// Build the collection if it is empty; no-op otherwise.
    pub async fn build(&self) -> Result<BuildReport> {
        let existing = self.count().await?;
        if existing > 0 {
            info!(
                collection = %self.config.collection,
                count = existing,
                "collection already populated, skipping build"
            );
            return Ok(BuildReport { indexed: existing, batches_skipped: 0 });
        }
        self.rebuild().await
    }

    /// Rebuild the collection from the record corpus, replacing the active
    /// contents only once the new build holds data.
    pub async fn rebuild(&self) -> Result<BuildReport> {
        let records = corpus::load_analyses(&self.config.data_dir);
        if records.is_empty() {
            return Err(RagError::PipelineError(format!(
                "no analyses found in '{}'",
                self.config.data_dir.display()
            )));
        }

        let units: Vec<IndexUnit> = records
            .iter()
            .enumerate()
            .map(|(index, record)| IndexUnit {
                id: format!("{}_{}_{index}", record.laboratoire, record.titre),
                text: record.search_text(),
                metadata: record.metadata(),
            })
            .collect();
        info!(analyses = units.len(), "analysis corpus normalized");

        build_collection(
            &self.vector_store,
            &self.embedding_provider,
            &self.config.collection,
            self.config.batch_size,
            &units,
        )
        .await
    }

    /// Answer a question from the analysis collection.
    ///
    /// Never fails: retrieval and generation errors degrade into the
    /// response per the pipeline error contracts.
    pub async fn ask(&self, question: &str) -> QueryResponse<AnalysisSource> {
        info!(question, "analysis pipeline query");
        let results = self.retriever.retrieve(question).await;
        let (answer, sources) =
            self.synthesizer.analyses(question, &results, self.config.context_limit).await;
        QueryResponse { answer, sources, query: question.to_string() }
    }
}

/// Builder for constructing an [`AnalysisPipeline`].
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<AnalysisPipelineConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chat_model: Option<Arc<dyn ChatModel>>,
}

impl AnalysisPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisPipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation model.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Build the [`AnalysisPipeline`], validating that all components are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a component is missing.
    pub fn build(self) -> Result<AnalysisPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| RagError::ConfigError("chat_model is required".to_string()))?;

        let retriever = Retriever::new(
            Arc::clone(&embedding_provider),
            Arc::clone(&vector_store),
            config.collection.clone(),
            config.top_k,
        );
        let synthesizer =
            Synthesizer::new(chat_model, config.max_output_tokens, config.temperature);

        Ok(AnalysisPipeline { config, embedding_provider, vector_store, retriever, synthesizer })
    }
}
