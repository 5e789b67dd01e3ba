// In-memory vector index over table chunks
// Built once from a chunk list; rebuilding is the only way to change it

#[cfg(test)]
mod tests;

use anyhow::Context;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::embeddings::{ContentChunk, Embedder};
use crate::{InsightsError, Result};

/// A chunk returned by [`VectorIndex::search`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: ContentChunk,
    /// Cosine similarity to the query, higher is closer
    pub similarity_score: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    chunk: ContentChunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every chunk and store it alongside its vector
    #[inline]
    pub fn build(chunks: Vec<ContentChunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            debug!("Building empty vector index");
            return Ok(Self::default());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .context("Failed to embed table chunks")
            .map_err(|e| InsightsError::Embedding(format!("{:#}", e)))?;

        Self::from_embeddings(chunks, embeddings)
    }

    /// Assemble an index from chunks and their precomputed vectors
    #[inline]
    pub fn from_embeddings(chunks: Vec<ContentChunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(InsightsError::Index(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings.first().map_or(0, Vec::len);
        if chunks.is_empty() {
            return Ok(Self::default());
        }
        if dimension == 0 {
            return Err(InsightsError::Index(
                "Embeddings must not be empty".to_string(),
            ));
        }
        if let Some((index, embedding)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != dimension)
        {
            return Err(InsightsError::Index(format!(
                "Embedding for chunk {} has dimension {}, expected {}",
                index,
                embedding.len(),
                dimension
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect::<Vec<_>>();

        info!(
            "Built vector index with {} chunks of dimension {}",
            entries.len(),
            dimension
        );
        Ok(Self { entries, dimension })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension, zero for an empty index
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Up to `k` chunks ordered by descending similarity to `query`.
    ///
    /// Equal scores keep chunk order. An empty index yields no results.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(InsightsError::Index(format!(
                "Query vector has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.embedding)))
            .collect();

        scored.sort_by(|(position_a, score_a), (position_b, score_b)| {
            match score_b.total_cmp(score_a) {
                Ordering::Equal => position_a.cmp(position_b),
                ordering => ordering,
            }
        });

        let results = scored
            .into_iter()
            .take(k)
            .map(|(position, similarity_score)| SearchResult {
                chunk: self.entries[position].chunk.clone(),
                similarity_score,
            })
            .collect::<Vec<_>>();

        debug!(
            "Vector search returned {} of {} chunks",
            results.len(),
            self.entries.len()
        );
        Ok(results)
    }
}

/// Cosine similarity in `[-1, 1]`; zero when either vector has no length
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let similarity = dot / denominator;
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(-1.0, 1.0)
    }
}
