//! In-memory vector index using cosine similarity, with optional
//! two-artifact disk persistence.
//!
//! The index is built wholesale from a chunk set and is read-only
//! afterwards; a changed document set means a full rebuild, never an
//! incremental update.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{SearchResult, VectorRecord};
use crate::error::{RagError, Result};

/// File name of the persisted vector records artifact.
const RECORDS_FILE: &str = "records.json";

/// File name of the persisted index metadata artifact.
const META_FILE: &str = "meta.json";

/// Metadata persisted next to the vector records.
///
/// `model_id` pins the embedding model the index was built with; loading an
/// index built with a different model is rejected rather than silently
/// producing wrong similarity scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct IndexMeta {
    model_id: String,
    dimensions: usize,
    record_count: usize,
}

/// An in-memory vector index over [`VectorRecord`]s.
///
/// Records are kept in insertion order so that equal-score search ties
/// resolve to the earlier input. Search uses cosine similarity, closest
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    records: Vec<VectorRecord>,
    model_id: String,
    dimensions: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorIndex {
    /// Build an index from a complete record set.
    ///
    /// All records must carry embeddings of the same dimensionality, produced
    /// by the embedding model identified by `model_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexBuild`] if the record set is empty or any
    /// record's embedding dimensionality differs from the first. No partial
    /// index exists after a failure.
    pub fn build(records: Vec<VectorRecord>, model_id: impl Into<String>) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| RagError::IndexBuild("cannot build an index from zero records".into()))?;

        let dimensions = first.embedding.len();
        if dimensions == 0 {
            return Err(RagError::IndexBuild("records carry zero-dimensional embeddings".into()));
        }

        for record in &records {
            if record.embedding.len() != dimensions {
                return Err(RagError::IndexBuild(format!(
                    "chunk '{}' has embedding dimension {} but the index expects {}",
                    record.chunk.id,
                    record.embedding.len(),
                    dimensions
                )));
            }
        }

        let model_id = model_id.into();
        info!(record_count = records.len(), dimensions, model_id = %model_id, "built vector index");

        Ok(Self { records, model_id, dimensions })
    }

    /// The identity of the embedding model this index was built with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of records in the index.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Search for the `top_k` records most similar to the given embedding.
    ///
    /// Results are ordered by descending cosine similarity; ties keep the
    /// records' insertion order. Returns an empty `Vec` (not an error) when
    /// `top_k` is zero or nothing is indexed.
    pub fn search(&self, embedding: &[f32], top_k: usize) -> Vec<SearchResult> {
        if top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<SearchResult> = self
            .records
            .iter()
            .map(|record| SearchResult {
                chunk: record.chunk.clone(),
                score: cosine_similarity(&record.embedding, embedding),
            })
            .collect();

        // Stable sort keeps input order for equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!(result_count = scored.len(), top_k, "index search completed");
        scored
    }

    /// Persist the index as two artifacts under `dir`: `records.json` and
    /// `meta.json`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexSave`] if the directory cannot be created or
    /// either artifact cannot be written.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            RagError::IndexSave(format!("cannot create '{}': {e}", dir.display()))
        })?;

        let meta = IndexMeta {
            model_id: self.model_id.clone(),
            dimensions: self.dimensions,
            record_count: self.records.len(),
        };

        let records_json = serde_json::to_string(&self.records)
            .map_err(|e| RagError::IndexSave(format!("cannot serialize records: {e}")))?;
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| RagError::IndexSave(format!("cannot serialize metadata: {e}")))?;

        fs::write(dir.join(RECORDS_FILE), records_json).map_err(|e| {
            RagError::IndexSave(format!("cannot write {RECORDS_FILE}: {e}"))
        })?;
        fs::write(dir.join(META_FILE), meta_json).map_err(|e| {
            RagError::IndexSave(format!("cannot write {META_FILE}: {e}"))
        })?;

        info!(path = %dir.display(), record_count = self.records.len(), "saved vector index");
        Ok(())
    }

    /// Load an index previously written by [`save`](VectorIndex::save).
    ///
    /// Both artifacts must exist; a missing file is a load failure, not a
    /// partial load. The caller is responsible for checking
    /// [`model_id`](VectorIndex::model_id) against the embedding provider in
    /// use — [`RagPipeline::load_index`](crate::pipeline::RagPipeline::load_index)
    /// does this.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexLoad`] if either artifact is missing or
    /// unparseable, or if the metadata disagrees with the records.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let meta_raw = fs::read_to_string(dir.join(META_FILE)).map_err(|e| {
            RagError::IndexLoad(format!("cannot read {META_FILE} in '{}': {e}", dir.display()))
        })?;
        let records_raw = fs::read_to_string(dir.join(RECORDS_FILE)).map_err(|e| {
            RagError::IndexLoad(format!("cannot read {RECORDS_FILE} in '{}': {e}", dir.display()))
        })?;

        let meta: IndexMeta = serde_json::from_str(&meta_raw)
            .map_err(|e| RagError::IndexLoad(format!("corrupt {META_FILE}: {e}")))?;
        let records: Vec<VectorRecord> = serde_json::from_str(&records_raw)
            .map_err(|e| RagError::IndexLoad(format!("corrupt {RECORDS_FILE}: {e}")))?;

        if records.len() != meta.record_count {
            return Err(RagError::IndexLoad(format!(
                "metadata claims {} records but {} were found",
                meta.record_count,
                records.len()
            )));
        }
        if records.iter().any(|r| r.embedding.len() != meta.dimensions) {
            return Err(RagError::IndexLoad(format!(
                "record embeddings do not all match metadata dimensionality {}",
                meta.dimensions
            )));
        }

        info!(path = %dir.display(), record_count = records.len(), model_id = %meta.model_id, "loaded vector index");

        Ok(Self { records, model_id: meta.model_id, dimensions: meta.dimensions })
    }
}
