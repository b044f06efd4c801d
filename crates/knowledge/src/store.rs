/// Storage abstraction for the chunked knowledge corpus.
use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::error::KnowledgeError;

/// Provenance metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name or logical label of the source document.
    pub source: String,
    /// Title of the markdown section this chunk came from, if any.
    #[serde(default)]
    pub section_title: String,
    /// Position of this chunk within its ingestion call.
    pub chunk_index: usize,
    /// Total number of chunks produced by that call.
    pub total_chunks: usize,
}

/// A chunk of text ready for ingestion, before embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A persisted chunk: content, provenance, and its embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

/// A ranked similarity hit returned by [`DocumentStore::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity between query and chunk, in `[-1, 1]`.
    pub score: f32,
}

/// The document store owns the persisted corpus and answers similarity
/// queries against it. One production implementation exists
/// ([`crate::store_json::JsonDocumentStore`]); the trait is the single
/// capability boundary for tests and future backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Embed `documents` in one batch call and append them to the corpus
    /// in input order, assigning fresh unique ids, then persist the whole
    /// corpus. No-op on empty input.
    ///
    /// An embedding failure aborts the call with nothing appended. A
    /// persist failure is reported as [`KnowledgeError::PersistFailed`],
    /// but the in-memory corpus keeps the appended chunks: callers must
    /// not assume durability until `ingest` returns `Ok`. Retrying a
    /// failed ingest from scratch is always safe.
    async fn ingest(&self, documents: Vec<DocumentInput>) -> Result<(), KnowledgeError>;

    /// Rank all stored chunks by cosine similarity to `text` and return
    /// the best `top_k` (fewer if the corpus is smaller). Ties keep
    /// corpus insertion order. An empty corpus yields an empty result
    /// without calling the embedding provider.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<QueryResult>, KnowledgeError>;

    /// Number of chunks in the corpus.
    async fn count(&self) -> usize;

    /// Empty the corpus and persist the empty state.
    async fn clear(&self) -> Result<(), KnowledgeError>;
}

/// Cosine similarity of two vectors.
///
/// Defined as `0.0` when either vector has zero magnitude. Comparing
/// vectors of unequal length is a contract violation and returns
/// [`KnowledgeError::DimensionMismatch`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, KnowledgeError> {
    if a.len() != b.len() {
        return Err(KnowledgeError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_is_symmetric() {
        let a = [0.3, -0.8, 0.5];
        let b = [0.9, 0.1, -0.2];
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_cosine_is_bounded() {
        let cases = [
            (vec![1.0, 0.0], vec![1.0, 0.0], 1.0),
            (vec![1.0, 0.0], vec![-1.0, 0.0], -1.0),
            (vec![1.0, 0.0], vec![0.0, 1.0], 0.0),
        ];
        for (a, b, expected) in cases {
            let score = cosine_similarity(&a, &b).unwrap();
            assert!((score - expected).abs() < 1e-6);
            assert!((-1.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = [0.0, 0.0, 0.0];
        let other = [0.5, 0.5, 0.5];
        assert_eq!(cosine_similarity(&zero, &other).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&other, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        match err {
            KnowledgeError::DimensionMismatch { left, right } => {
                assert_eq!(left, 2);
                assert_eq!(right, 3);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_chunk_serde_round_trip() {
        let chunk = Chunk {
            id: "abc".into(),
            content: "Some content".into(),
            metadata: ChunkMetadata {
                source: "notes.md".into(),
                section_title: "Intro".into(),
                chunk_index: 0,
                total_chunks: 2,
            },
            embedding: vec![0.25, -0.5],
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }
}
