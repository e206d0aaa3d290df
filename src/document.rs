//! Data types for documents, chunks, vector records, and results.

use serde::{Deserialize, Serialize};

/// A unit of extracted source text, typically one PDF page.
///
/// The upload boundary extracts text before it reaches this crate; a
/// `Document` is that extracted text plus the origin needed for citations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (stable across rebuilds).
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// Path or name of the originating file.
    pub source: String,
    /// Page number within the originating file, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A bounded span of a [`Document`], tagged with its origin.
///
/// Chunks are immutable once created and never have empty content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// Unique identifier, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Path or name of the originating file, inherited from the document.
    pub source: String,
    /// Page number inherited from the document, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A [`DocumentChunk`] paired with its embedding vector inside the index.
///
/// Created at index build time and never mutated; discarded wholesale when
/// the index is rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// The indexed chunk.
    pub chunk: DocumentChunk,
    /// The embedding vector for the chunk's content.
    pub embedding: Vec<f32>,
}

/// A retrieved [`DocumentChunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: DocumentChunk,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}

/// The outcome of one answer-generation call.
///
/// `answer` is `None` when generation failed; `sources` is deduplicated and
/// sorted alphabetically. Not persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerResult {
    /// The generated answer, or `None` if generation failed.
    pub answer: Option<String>,
    /// Formatted citation strings, one per distinct source.
    pub sources: Vec<String>,
}

impl AnswerResult {
    /// The documented failure result: no answer, no sources.
    pub fn failed() -> Self {
        Self { answer: None, sources: Vec::new() }
    }
}
