use super::*;
use crate::embeddings::{ChunkingConfig, chunk_text};

fn chunk(index: usize, content: &str) -> ContentChunk {
    ContentChunk {
        content: content.to_string(),
        chunk_index: index,
        start: 0,
        end: content.len(),
        overlap: 0,
        char_count: content.chars().count(),
    }
}

/// Maps each text onto a vector from its letter counts
struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vector = vec![0.0; 4];
        for c in text.chars() {
            match c {
                'a' => vector[0] += 1.0,
                'b' => vector[1] += 1.0,
                'c' => vector[2] += 1.0,
                _ => vector[3] += 1.0,
            }
        }
        Ok(vector)
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow::anyhow!("embedding service unavailable"))
    }
}

struct RaggedEmbedder;

impl Embedder for RaggedEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0; text.len()])
    }
}

fn sample_index() -> VectorIndex {
    let chunks = vec![chunk(0, "aaa"), chunk(1, "bbb"), chunk(2, "ccc"), chunk(3, "aab")];
    VectorIndex::build(chunks, &LetterEmbedder).expect("index should build")
}

#[test]
fn build_stores_every_chunk() {
    let index = sample_index();

    assert_eq!(index.len(), 4);
    assert_eq!(index.dimension(), 4);
    assert!(!index.is_empty());
}

#[test]
fn search_ranks_by_similarity() {
    let index = sample_index();
    let query = LetterEmbedder.embed("a").expect("embed");

    let results = index.search(&query, 2).expect("search should succeed");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.content, "aaa");
    assert_eq!(results[1].chunk.content, "aab");
    assert!(results[0].similarity_score >= results[1].similarity_score);
    assert!((results[0].similarity_score - 1.0).abs() < 1e-6);
}

#[test]
fn search_returns_min_of_k_and_len() {
    let index = sample_index();
    let query = LetterEmbedder.embed("abc").expect("embed");

    for k in 0..8 {
        let results = index.search(&query, k).expect("search should succeed");
        assert_eq!(results.len(), k.min(index.len()));
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }
}

#[test]
fn ties_keep_chunk_order() {
    let chunks = vec![chunk(0, "x"), chunk(1, "y"), chunk(2, "z")];
    let embeddings = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]];
    let index = VectorIndex::from_embeddings(chunks, embeddings).expect("index should build");

    let results = index.search(&[1.0, 0.0], 3).expect("search should succeed");
    let order: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn empty_index_returns_nothing() {
    let index = VectorIndex::build(Vec::new(), &LetterEmbedder).expect("empty index builds");

    assert!(index.is_empty());
    let results = index.search(&[1.0, 2.0, 3.0], 4).expect("search should succeed");
    assert!(results.is_empty());
}

#[test]
fn query_dimension_mismatch() {
    let index = sample_index();
    assert!(matches!(
        index.search(&[1.0, 0.0], 2),
        Err(InsightsError::Index(_))
    ));
}

#[test]
fn embedder_failure_is_reported() {
    let result = VectorIndex::build(vec![chunk(0, "aaa")], &FailingEmbedder);

    match result {
        Err(InsightsError::Embedding(message)) => {
            assert!(message.contains("embedding service unavailable"));
        }
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[test]
fn inconsistent_dimensions_are_rejected() {
    let chunks = vec![chunk(0, "ab"), chunk(1, "abc")];
    assert!(matches!(
        VectorIndex::build(chunks, &RaggedEmbedder),
        Err(InsightsError::Index(_))
    ));
}

#[test]
fn embedding_count_mismatch_is_rejected() {
    let result = VectorIndex::from_embeddings(vec![chunk(0, "a")], Vec::new());
    assert!(matches!(result, Err(InsightsError::Index(_))));
}

#[test]
fn builds_from_chunked_text() {
    let text = "aaaa\nbbbb\ncccc\n".repeat(20);
    let config = ChunkingConfig {
        chunk_size: 100,
        chunk_overlap: 10,
        ..ChunkingConfig::default()
    };
    let chunks = chunk_text(&text, &config);
    let chunk_count = chunks.len();

    let index = VectorIndex::build(chunks, &LetterEmbedder).expect("index should build");
    assert_eq!(index.len(), chunk_count);
}

#[test]
fn cosine_similarity_values() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
}
