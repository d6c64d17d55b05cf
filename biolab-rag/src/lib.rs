//! # biolab-rag
//!
//! Retrieval-augmented question answering over a medical laboratory
//! corpus: ingest documents and structured analysis records, embed them
//! into named vector collections, and answer natural-language questions
//! with grounded, cited French answers.
//!
//! ## Overview
//!
//! Two pipelines share the same workflow over different corpora:
//!
//! - [`DocumentPipeline`] — markdown documents, split into overlapping
//!   token-bounded chunks ([`TokenChunker`])
//! - [`AnalysisPipeline`] — heterogeneous laboratory records, normalized
//!   into a flat schema ([`AnalysisRecord`])
//!
//! Both compose an [`EmbeddingProvider`], a [`VectorStore`], and a
//! generation model (`biolab_model::ChatModel`) behind `build()` / `ask()`
//! entry points:
//!
//! ```text
//! ingest → chunk/normalize → embed (batched) → store
//!                     [query] → embed → retrieve → assemble → synthesize
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use biolab_model::OpenAIChatModel;
//! use biolab_rag::{
//!     DocumentPipeline, DocumentPipelineConfig, InMemoryVectorStore,
//!     OpenAIEmbeddingProvider,
//! };
//!
//! let pipeline = DocumentPipeline::builder()
//!     .config(DocumentPipelineConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chat_model(Arc::new(OpenAIChatModel::from_env("gpt-4")?))
//!     .build()?;
//!
//! pipeline.build().await?;
//! let response = pipeline.ask("Comment interpréter une sérologie CMV ?").await;
//! println!("{}", response.answer);
//! ```

pub mod analysis;
pub mod chunking;
pub mod config;
pub mod context;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;
pub mod vectorstore;

pub use analysis::{AnalysisRecord, RawAnalysis, UNKNOWN_LABORATORY, laboratory_for_filename};
pub use chunking::TokenChunker;
pub use config::{AnalysisPipelineConfig, DocumentPipelineConfig};
pub use corpus::UNTITLED_DOCUMENT;
pub use document::{Chunk, Document};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{
    AnalysisPipeline, AnalysisPipelineBuilder, BuildReport, DocumentPipeline,
    DocumentPipelineBuilder, SourceSummary,
};
pub use retriever::{Retrieved, Retriever};
pub use synthesizer::{
    ANALYSES_NOT_FOUND, AnalysisSource, DOCUMENTS_NOT_FOUND, DocumentSource, QueryResponse,
    Synthesizer,
};
pub use vectorstore::{Entry, QueryMatch, VectorStore};
