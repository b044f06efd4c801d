/// Ollama embeddings provider using the `/api/embeddings` endpoint.
use std::time::Duration;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{embeddings::EmbeddingProvider, error::KnowledgeError};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Embedding provider backed by an Ollama server.
///
/// Ollama embeds one prompt per request, so a batch is issued as
/// sequential round trips rather than parallel fan-out; this bounds the
/// load placed on the local model server.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for `model` served at `base_url`
    /// (e.g. `http://localhost:11434`).
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn embed_one(&self, index: usize, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| embedding_failed(index, e))?
            .error_for_status()
            .map_err(|e| embedding_failed(index, e))?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| embedding_failed(index, e))?;

        Ok(response.embedding)
    }
}

fn embedding_failed(index: usize, err: reqwest::Error) -> KnowledgeError {
    KnowledgeError::EmbeddingFailed {
        index: Some(index),
        reason: err.to_string(),
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            vectors.push(self.embed_one(index, text).await?);
        }
        Ok(vectors)
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        self.embed_one(0, text).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
