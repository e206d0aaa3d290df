//! Top-K retrieval over a session's vector index.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::session::RagSession;

/// A source of relevant chunks for a query.
///
/// The answer generator depends on this seam rather than on a concrete
/// index, mirroring how retrieval backends stay swappable elsewhere in the
/// pipeline.
#[async_trait]
pub trait ChunkRetriever: Send + Sync {
    /// Fetch chunks relevant to `query` from the session's index, ranked
    /// closest first. An empty result set is a valid outcome, not an error.
    async fn retrieve(&self, session: &RagSession, query: &str) -> Result<Vec<SearchResult>>;
}

/// Retrieves the top-K most relevant chunks for a query.
///
/// Embeds the query with the configured provider and searches the session's
/// index. A session with no index yields the distinct
/// [`RagError::IndexUnavailable`] condition; an index that simply matches
/// nothing yields an empty result set, which callers must treat as a valid
/// state.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever with the given embedding provider and top-K.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    /// The configured result count.
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[async_trait]
impl ChunkRetriever for Retriever {
    /// Retrieve up to `top_k` chunks relevant to `query` from the session's
    /// index.
    ///
    /// # Errors
    ///
    /// - [`RagError::IndexUnavailable`] if the session has no built or
    ///   loaded index
    /// - [`RagError::Embedding`] if the query cannot be embedded
    async fn retrieve(&self, session: &RagSession, query: &str) -> Result<Vec<SearchResult>> {
        let index = session.index().ok_or(RagError::IndexUnavailable)?;
        if session.is_stale() {
            warn!("retrieving against a stale index; results may not reflect recent uploads");
        }

        debug!(top_k = self.top_k, "embedding query for retrieval");
        let query_embedding = self.embedder.embed(query).await?;

        let results = index.search(&query_embedding, self.top_k);
        info!(result_count = results.len(), top_k = self.top_k, "retrieval completed");
        Ok(results)
    }
}
