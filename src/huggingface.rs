//! Hugging Face embedding provider using the Inference API.
//!
//! This module is only available when the `huggingface` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The base URL for Hugging Face feature-extraction inference.
const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// The default sentence-transformers model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// The default dimensionality for `all-MiniLM-L6-v2`.
const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by the Hugging Face Inference API.
///
/// Uses `reqwest` to call the feature-extraction pipeline endpoint for a
/// sentence-transformers model.
///
/// # Configuration
///
/// - `model` – defaults to `sentence-transformers/all-MiniLM-L6-v2`.
/// - `api_key` – from the constructor or the `HF_API_TOKEN` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::huggingface::HfEmbeddingProvider;
///
/// let provider = HfEmbeddingProvider::new("hf_...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct HfEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl HfEmbeddingProvider {
    /// Create a new provider with the given API token.
    ///
    /// Uses the default model (`sentence-transformers/all-MiniLM-L6-v2`)
    /// and dimensions (384).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: "API token must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `HF_API_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("HF_API_TOKEN").map_err(|_| RagError::Embedding {
            provider: "HuggingFace".into(),
            message: "HF_API_TOKEN environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `sentence-transformers/all-mpnet-base-v2`)
    /// and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

// ── Inference API request/response types ───────────────────────────

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for HfEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "HuggingFace", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "HuggingFace".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "HuggingFace",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let url = format!("{HF_INFERENCE_URL}/{}", self.model);
        let request_body = FeatureExtractionRequest { inputs: texts.to_vec() };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "HuggingFace", error = %e, "request failed");
                RagError::Embedding {
                    provider: "HuggingFace".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);

            error!(provider = "HuggingFace", %status, "API error");
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            error!(provider = "HuggingFace", error = %e, "failed to parse response");
            RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding {
                provider: "HuggingFace".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
