//! Error types for the `docqa` crate.

use thiserror::Error;

/// Errors that can occur in the question-answering pipeline.
///
/// Everything below the answer-generation boundary propagates as one of
/// these variants; [`AnswerGenerator`](crate::generation::AnswerGenerator)
/// itself converts failures into its absent-answer result instead.
#[derive(Debug, Error)]
pub enum RagError {
    /// The query was absent entirely.
    #[error("Query cannot be null")]
    NullQuery,

    /// The query was empty or whitespace-only after trimming.
    #[error("Query cannot be empty after stripping whitespace")]
    EmptyQuery,

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index could not be built.
    #[error("Index build error: {0}")]
    IndexBuild(String),

    /// The vector index could not be written to disk.
    #[error("Index save error: {0}")]
    IndexSave(String),

    /// The vector index could not be read back from disk.
    #[error("Index load error: {0}")]
    IndexLoad(String),

    /// A persisted index was embedded with a different model than the one
    /// currently configured. Mixing vectors across models silently corrupts
    /// similarity scores, so this is a hard failure.
    #[error("Embedding model mismatch: index was built with '{index_model}', provider is '{provider_model}'")]
    ModelMismatch {
        /// Model recorded in the index metadata.
        index_model: String,
        /// Model reported by the configured embedding provider.
        provider_model: String,
    },

    /// Retrieval was attempted before any index was built or loaded.
    #[error("Vector index is not available; build or load an index first")]
    IndexUnavailable,

    /// An error occurred while invoking the language model.
    #[error("Language model error ({model}): {message}")]
    Model {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
