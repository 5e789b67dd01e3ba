// Embeddings module
// Splits the serialized table into chunks and turns text into vectors

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, ContentChunk, chunk_table, chunk_text, reassemble};
pub use ollama::OllamaClient;

/// A text embedding backend.
///
/// Implementations must return vectors of one fixed dimension and the same
/// vector for the same input.
pub trait Embedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed several texts, one vector per input in input order
    #[inline]
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
