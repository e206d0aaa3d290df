//! Pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full workflow by composing an
//! [`EmbeddingProvider`], a [`LanguageModel`], and a [`Chunker`] around a
//! caller-owned [`RagSession`]:
//!
//! - build time: chunk → embed → index → install into the session
//! - query time: validate → retrieve → prompt → generate → attribute
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa::{RagPipeline, RagConfig, RagSession, RecursiveChunker};
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .language_model(Arc::new(my_model))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .build()?;
//!
//! let mut session = RagSession::new();
//! pipeline.build_index(&mut session, &documents).await?;
//! let result = pipeline.answer(&session, Some("What is RAG?")).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{AnswerResult, Document, DocumentChunk, VectorRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::AnswerGenerator;
use crate::index::VectorIndex;
use crate::llm::LanguageModel;
use crate::query::format_query;
use crate::retriever::Retriever;
use crate::session::RagSession;

/// The pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. The pipeline itself is
/// stateless across calls; all per-session state lives in the caller-owned
/// [`RagSession`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    language_model: Arc<dyn LanguageModel>,
    chunker: Arc<dyn Chunker>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Build an index over `documents` and install it into the session.
    ///
    /// Runs chunk → embed → index as one transaction: on any failure the
    /// session keeps whatever index it had before (no partially built index
    /// is ever installed).
    ///
    /// # Errors
    ///
    /// - [`RagError::Chunking`] if the document set produces zero chunks
    /// - [`RagError::Embedding`] if the provider fails for any chunk
    /// - [`RagError::IndexBuild`] if the record set is inconsistent
    pub async fn build_index(
        &self,
        session: &mut RagSession,
        documents: &[Document],
    ) -> Result<()> {
        let mut chunks: Vec<DocumentChunk> = Vec::new();
        for document in documents {
            chunks.extend(self.chunker.chunk(document));
        }
        if chunks.is_empty() {
            error!(document_count = documents.len(), "document set produced no chunks");
            return Err(RagError::Chunking(
                "document set produced no chunks to index".to_string(),
            ));
        }
        info!(document_count = documents.len(), chunk_count = chunks.len(), "chunked documents");

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during index build");
            e
        })?;

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord { chunk, embedding })
            .collect();

        let index = VectorIndex::build(records, self.embedding_provider.model_id())?;
        session.install(index);
        Ok(())
    }

    /// Answer a raw user query against the session's index.
    ///
    /// Input errors (null/empty query, no index built) propagate so callers
    /// can surface them distinctly; everything past that point is absorbed
    /// by the answer generator, which reports failures as
    /// `{answer: None, sources: []}`.
    ///
    /// # Errors
    ///
    /// - [`RagError::NullQuery`] / [`RagError::EmptyQuery`] for rejected input
    /// - [`RagError::IndexUnavailable`] when no documents have been indexed
    pub async fn answer(
        &self,
        session: &RagSession,
        raw_query: Option<&str>,
    ) -> Result<AnswerResult> {
        let query = format_query(raw_query)?;
        if session.index().is_none() {
            return Err(RagError::IndexUnavailable);
        }

        let retriever =
            Arc::new(Retriever::new(Arc::clone(&self.embedding_provider), self.config.top_k));
        let generator = AnswerGenerator::new(Arc::clone(&self.language_model), retriever);
        Ok(generator.generate(session, &query).await)
    }

    /// Persist the session's index under `dir` (or the configured
    /// `index_path` when `dir` is `None`).
    ///
    /// # Errors
    ///
    /// - [`RagError::IndexUnavailable`] if the session has no index
    /// - [`RagError::Config`] if neither `dir` nor `index_path` is set
    /// - [`RagError::IndexSave`] on write failure
    pub fn save_index(&self, session: &RagSession, dir: Option<&Path>) -> Result<()> {
        let index = session.index().ok_or(RagError::IndexUnavailable)?;
        let dir = self.resolve_index_path(dir)?;
        index.save(dir)
    }

    /// Load a persisted index from `dir` (or the configured `index_path`)
    /// and install it into the session.
    ///
    /// The persisted model identity must match the configured embedding
    /// provider; a mismatch would silently corrupt similarity scores, so it
    /// is rejected before installation.
    ///
    /// # Errors
    ///
    /// - [`RagError::Config`] if neither `dir` nor `index_path` is set
    /// - [`RagError::IndexLoad`] on missing or corrupt artifacts
    /// - [`RagError::ModelMismatch`] if the index was embedded with a
    ///   different model
    pub fn load_index(&self, session: &mut RagSession, dir: Option<&Path>) -> Result<()> {
        let dir = self.resolve_index_path(dir)?;
        let index = VectorIndex::load(dir)?;

        let provider_model = self.embedding_provider.model_id();
        if index.model_id() != provider_model {
            error!(
                index_model = index.model_id(),
                provider_model,
                "refusing to load index built with a different embedding model"
            );
            return Err(RagError::ModelMismatch {
                index_model: index.model_id().to_string(),
                provider_model: provider_model.to_string(),
            });
        }

        session.install(index);
        Ok(())
    }

    fn resolve_index_path<'a>(&'a self, dir: Option<&'a Path>) -> Result<&'a Path> {
        dir.or(self.config.index_path.as_deref()).ok_or_else(|| {
            RagError::Config("no index path given and none configured".to_string())
        })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the language model used for answer generation.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// The config's advisory `embedding_model` and `language_model` names are
    /// checked against the injected backends; a disagreement logs a warning
    /// (the backends are authoritative) but does not fail the build.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let language_model = self
            .language_model
            .ok_or_else(|| RagError::Config("language_model is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        // Suffix match tolerates org-prefixed ids like
        // "sentence-transformers/all-MiniLM-L6-v2" vs "all-MiniLM-L6-v2"
        if !embedding_provider.model_id().ends_with(&config.embedding_model) {
            warn!(
                configured = %config.embedding_model,
                provider = embedding_provider.model_id(),
                "configured embedding model does not match the injected provider; the provider is authoritative"
            );
        }
        if !language_model.name().ends_with(&config.language_model) {
            warn!(
                configured = %config.language_model,
                model = language_model.name(),
                "configured language model does not match the injected backend; the backend is authoritative"
            );
        }

        Ok(RagPipeline { config, embedding_provider, language_model, chunker })
    }
}
