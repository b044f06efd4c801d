//! JSON file-backed document store.
//!
//! The whole corpus lives in one JSON file that is loaded at
//! construction and rewritten in full on every mutation. That is fine
//! for the target corpus size (hundreds to low thousands of chunks); a
//! larger deployment would swap this for an append-friendly log behind
//! the same [`DocumentStore`] trait.

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    async_trait::async_trait,
    tokio::sync::RwLock,
    tracing::{debug, info, warn},
    uuid::Uuid,
};

use crate::{
    embeddings::EmbeddingProvider,
    error::KnowledgeError,
    store::{Chunk, DocumentInput, DocumentStore, QueryResult, cosine_similarity},
};

/// Document store persisting chunks and their embeddings to a JSON file.
pub struct JsonDocumentStore {
    path: PathBuf,
    provider: Arc<dyn EmbeddingProvider>,
    corpus: RwLock<Vec<Chunk>>,
}

impl JsonDocumentStore {
    /// Open a store at `path`, loading any existing corpus.
    ///
    /// A missing file means an empty corpus. A corrupt file is logged as
    /// a warning and treated as empty: the assistant keeps running with
    /// no knowledge base rather than refusing to start.
    pub async fn open(path: impl Into<PathBuf>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let path = path.into();
        let corpus = match Self::load(&path).await {
            Ok(chunks) => chunks,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "starting with empty knowledge base");
                Vec::new()
            },
        };
        Self {
            path,
            provider,
            corpus: RwLock::new(corpus),
        }
    }

    async fn load(path: &Path) -> Result<Vec<Chunk>, KnowledgeError> {
        if !path.exists() {
            debug!(path = %path.display(), "no knowledge base file yet");
            return Ok(Vec::new());
        }
        let corrupt = |reason: String| KnowledgeError::CorpusLoadCorrupt {
            path: path.display().to_string(),
            reason,
        };
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| corrupt(e.to_string()))?;
        let chunks: Vec<Chunk> =
            serde_json::from_str(&data).map_err(|e| corrupt(e.to_string()))?;
        info!(path = %path.display(), count = chunks.len(), "loaded knowledge base");
        Ok(chunks)
    }

    /// Rewrite the whole corpus file. Called with the write lock held.
    async fn save(&self, corpus: &[Chunk]) -> Result<(), KnowledgeError> {
        let persist_failed = |reason: String| KnowledgeError::PersistFailed {
            path: self.path.display().to_string(),
            reason,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| persist_failed(e.to_string()))?;
            }
        }
        let data =
            serde_json::to_string_pretty(corpus).map_err(|e| persist_failed(e.to_string()))?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| persist_failed(e.to_string()))?;
        debug!(path = %self.path.display(), count = corpus.len(), "saved knowledge base");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn ingest(&self, documents: Vec<DocumentInput>) -> Result<(), KnowledgeError> {
        if documents.is_empty() {
            return Ok(());
        }

        let contents: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        info!(count = documents.len(), model = self.provider.model_name(), "embedding documents");
        // One batch call before taking the lock: an embedding failure
        // aborts here with the corpus untouched.
        let embeddings = self.provider.embed(&contents).await?;

        let mut corpus = self.corpus.write().await;

        // The first chunk ever ingested fixes the corpus-wide dimension.
        let expected = corpus
            .first()
            .map(|c| c.embedding.len())
            .or_else(|| embeddings.first().map(Vec::len));
        if let Some(expected) = expected {
            for embedding in &embeddings {
                if embedding.len() != expected {
                    return Err(KnowledgeError::DimensionMismatch {
                        left: expected,
                        right: embedding.len(),
                    });
                }
            }
        }

        for (doc, embedding) in documents.into_iter().zip(embeddings) {
            corpus.push(Chunk {
                id: Uuid::new_v4().to_string(),
                content: doc.content,
                metadata: doc.metadata,
                embedding,
            });
        }

        self.save(&corpus).await?;
        info!(total = corpus.len(), "ingested documents");
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<QueryResult>, KnowledgeError> {
        if self.corpus.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed_single(text).await?;

        let corpus = self.corpus.read().await;
        let mut results = Vec::with_capacity(corpus.len());
        for chunk in corpus.iter() {
            let score = cosine_similarity(&query_embedding, &chunk.embedding)?;
            results.push(QueryResult {
                id: chunk.id.clone(),
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                score,
            });
        }
        drop(corpus);

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    async fn count(&self) -> usize {
        self.corpus.read().await.len()
    }

    async fn clear(&self) -> Result<(), KnowledgeError> {
        let mut corpus = self.corpus.write().await;
        corpus.clear();
        self.save(&corpus).await?;
        info!(path = %self.path.display(), "cleared knowledge base");
        Ok(())
    }
}
