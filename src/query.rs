//! Query normalization and validation.
//!
//! Retrieval operates on the raw trimmed query text produced here; any
//! prompt decoration happens later in [`generation`](crate::generation) so
//! that presentation never leaks into search semantics.

use tracing::{debug, error};

use crate::error::{RagError, Result};

/// Normalize a raw user query for retrieval.
///
/// Trims leading and trailing whitespace; internal whitespace is preserved
/// verbatim.
///
/// # Errors
///
/// - [`RagError::NullQuery`] if the query is absent
/// - [`RagError::EmptyQuery`] if it is empty or whitespace-only after trimming
pub fn format_query(raw: Option<&str>) -> Result<String> {
    let raw = raw.ok_or_else(|| {
        error!("received null query");
        RagError::NullQuery
    })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        error!("query is empty after stripping whitespace");
        return Err(RagError::EmptyQuery);
    }

    debug!(query_len = trimmed.len(), "query normalized");
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_query_is_a_distinct_error() {
        assert!(matches!(format_query(None), Err(RagError::NullQuery)));
    }

    #[test]
    fn whitespace_only_query_is_empty_error() {
        assert!(matches!(format_query(Some("")), Err(RagError::EmptyQuery)));
        assert!(matches!(format_query(Some("   \t\n ")), Err(RagError::EmptyQuery)));
    }

    #[test]
    fn trims_edges_and_preserves_internal_whitespace() {
        let formatted = format_query(Some("  what   is\tRAG?\n")).unwrap();
        assert_eq!(formatted, "what   is\tRAG?");
    }

    #[test]
    fn plain_query_passes_through() {
        assert_eq!(format_query(Some("What is RAG?")).unwrap(), "What is RAG?");
    }
}
