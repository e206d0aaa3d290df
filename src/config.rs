//! Configuration for the question-answering pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Default embedding model identity.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Default language model identity.
pub const DEFAULT_LANGUAGE_MODEL: &str = "gpt-3.5-turbo";

/// Configuration parameters for the pipeline.
///
/// API keys are deliberately absent: providers read them from constructor
/// arguments or the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Identity of the embedding model this configuration expects.
    ///
    /// Advisory: the injected [`EmbeddingProvider`](crate::EmbeddingProvider)
    /// is authoritative for the model actually used (and for the identity
    /// stored with the index); the pipeline builder warns when the two
    /// disagree.
    pub embedding_model: String,
    /// Identity of the language model this configuration expects.
    ///
    /// Advisory in the same way as `embedding_model`: the injected
    /// [`LanguageModel`](crate::LanguageModel) is authoritative.
    pub language_model: String,
    /// Sampling temperature this configuration expects of the language
    /// model. Advisory: backends carry their own temperature setting
    /// (see `OpenAIChatModel::with_temperature`).
    pub temperature: f32,
    /// Directory for persisted index artifacts, if persistence is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            language_model: DEFAULT_LANGUAGE_MODEL.to_string(),
            temperature: 0.0,
            index_path: None,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the embedding model identity.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the language model identity.
    pub fn language_model(mut self, model: impl Into<String>) -> Self {
        self.config.language_model = model.into();
        self
    }

    /// Set the language model sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the directory for persisted index artifacts.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = Some(path.into());
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.embedding_model, "all-MiniLM-L6-v2");
        assert_eq!(config.language_model, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn builder_rejects_overlap_not_less_than_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }
}
