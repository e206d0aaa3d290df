//! Language model trait for answer generation.

use async_trait::async_trait;

use crate::error::Result;

/// A language model that completes a prompt with generated text.
///
/// Implementations wrap a specific chat/completions backend. The pipeline
/// invokes the model once per query with a fully assembled prompt; no
/// retries are performed.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the identity of the underlying model.
    fn name(&self) -> &str;

    /// Generate a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Model`](crate::RagError::Model) if the backend
    /// cannot be reached or returns no content.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
