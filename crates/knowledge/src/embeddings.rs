/// Provider-agnostic embedding trait for turning text into vectors.
use async_trait::async_trait;

use crate::error::KnowledgeError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts.
    ///
    /// Order-preserving: one vector per input text, in input order. Any
    /// failure aborts the whole batch with [`KnowledgeError::EmbeddingFailed`];
    /// there are no partial results.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError>;

    /// Generate an embedding for a single text.
    /// Default implementation delegates to [`embed`](Self::embed).
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| KnowledgeError::EmbeddingFailed {
            index: Some(0),
            reason: "provider returned no vector".into(),
        })
    }

    /// The model name used by this provider (e.g. "nomic-embed-text").
    fn model_name(&self) -> &str;
}
