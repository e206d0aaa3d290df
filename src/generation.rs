//! Grounded answer generation with source attribution.
//!
//! The [`AnswerGenerator`] runs the stateless single-pass pipeline
//! retrieve → format → prompt → generate → attribute, and is the terminal
//! error boundary: failures are logged and converted into
//! [`AnswerResult::failed`], never propagated to the caller.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::{AnswerResult, DocumentChunk};
use crate::llm::LanguageModel;
use crate::retriever::ChunkRetriever;
use crate::session::RagSession;

/// Prompt wrapper instructing the model to answer only from the supplied
/// context.
const RAG_PROMPT_TEMPLATE: &str = "\
CONTEXT:
{context}

QUESTION:
{question}

Answer the QUESTION based only on the provided CONTEXT. If the context \
doesn't contain the answer, state that you cannot answer based on the \
provided information.";

/// Join chunk contents in retrieval-rank order, separated by one blank line.
///
/// An empty slice yields the empty string; a single chunk yields exactly its
/// content.
pub fn format_docs(chunks: &[DocumentChunk]) -> String {
    debug!(chunk_count = chunks.len(), "formatting chunks for context");
    chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Format a citation for a retrieved chunk.
///
/// Yields `Source: {basename}, Page {n}`, or `Source: {basename}` when the
/// page is unknown. The basename is the final component of the source path.
pub fn format_citation(chunk: &DocumentChunk) -> String {
    let basename = Path::new(&chunk.source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| chunk.source.clone());

    match chunk.page {
        Some(page) => format!("Source: {basename}, Page {page}"),
        None => format!("Source: {basename}"),
    }
}

/// Assemble the final model prompt from a context block and the question.
fn build_prompt(context: &str, question: &str) -> String {
    RAG_PROMPT_TEMPLATE.replace("{context}", context).replace("{question}", question)
}

/// Generates grounded answers with source citations.
///
/// Each call is a stateless single pass; no retries are performed. A failed
/// retrieval or model call produces the documented
/// `{answer: None, sources: []}` result with the failure logged in full.
pub struct AnswerGenerator {
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn ChunkRetriever>,
}

impl AnswerGenerator {
    /// Create a generator from a language model and a retriever.
    pub fn new(llm: Arc<dyn LanguageModel>, retriever: Arc<dyn ChunkRetriever>) -> Self {
        Self { llm, retriever }
    }

    /// Generate an answer for `query` grounded in chunks retrieved from the
    /// session's index.
    ///
    /// Zero retrieved chunks is not a failure: the model is invoked with an
    /// empty context block and the result carries no sources. This method
    /// never returns an error; all failures surface as
    /// [`AnswerResult::failed`] plus an error-level log event.
    pub async fn generate(&self, session: &RagSession, query: &str) -> AnswerResult {
        info!(query = %truncate(query, 100), "generating answer");

        // 1. Retrieve relevant chunks
        let results = match self.retriever.retrieve(session, query).await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "retrieval failed during answer generation");
                return AnswerResult::failed();
            }
        };
        let chunks: Vec<DocumentChunk> = results.into_iter().map(|r| r.chunk).collect();

        // 2-3. Format context and assemble the prompt
        let context = format_docs(&chunks);
        let prompt = build_prompt(&context, query);

        // 4. Invoke the model
        let answer = match self.llm.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(model = self.llm.name(), error = %e, "model invocation failed");
                return AnswerResult::failed();
            }
        };

        // 5. Attribute sources, deduplicated and sorted
        let sources: BTreeSet<String> = chunks.iter().map(format_citation).collect();
        let sources: Vec<String> = sources.into_iter().collect();

        info!(source_count = sources.len(), "answer generated");
        AnswerResult { answer: Some(answer), sources }
    }
}

/// Truncate a string for log output without splitting a character.
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
