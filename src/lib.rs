//! # docqa
//!
//! Retrieval-augmented question answering over uploaded PDF documents.
//!
//! ## Overview
//!
//! The crate wires four components into a thin workflow around a
//! caller-owned session:
//!
//! - [`Chunker`] — splits extracted page text into overlapping chunks
//! - [`EmbeddingProvider`] — maps text to fixed-dimension vectors
//! - [`VectorIndex`] — cosine-similarity search, optionally persisted to disk
//! - [`LanguageModel`] — generates a grounded answer from retrieved context
//!
//! Build time runs chunk → embed → index; query time runs validate →
//! retrieve → prompt → generate → attribute. The [`AnswerGenerator`] is the
//! terminal error boundary: a failed model call or retrieval yields
//! `{answer: None, sources: []}` with the failure logged, never a panic or
//! propagated error.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa::{Document, RagConfig, RagPipeline, RagSession, RecursiveChunker};
//! use docqa::huggingface::HfEmbeddingProvider;
//! use docqa::openai::OpenAIChatModel;
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(HfEmbeddingProvider::from_env()?))
//!     .language_model(Arc::new(OpenAIChatModel::from_env()?))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .build()?;
//!
//! let mut session = RagSession::new();
//! pipeline.build_index(&mut session, &documents).await?;
//! let result = pipeline.answer(&session, Some("What is RAG?")).await?;
//! println!("{:?}", result.answer);
//! for source in &result.sources {
//!     println!("{source}");
//! }
//! ```
//!
//! ## External collaborators
//!
//! Upload validation (file count/size/MIME), PDF text extraction, log
//! subscriber setup, and environment configuration live outside this crate.
//! Callers hand in [`Document`]s of already-extracted text and attach their
//! own `tracing` subscriber.
//!
//! ## Features
//!
//! - `huggingface` — [`huggingface::HfEmbeddingProvider`] (Inference API)
//! - `openai` — [`openai::OpenAIChatModel`] (chat completions)

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
#[cfg(feature = "huggingface")]
pub mod huggingface;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod query;
pub mod retriever;
pub mod session;

#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{AnswerResult, Document, DocumentChunk, SearchResult, VectorRecord};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{AnswerGenerator, format_citation, format_docs};
pub use index::VectorIndex;
pub use llm::LanguageModel;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use query::format_query;
pub use retriever::{ChunkRetriever, Retriever};
pub use session::{RagSession, SessionState};
