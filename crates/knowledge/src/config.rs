use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{embeddings_ollama::OllamaEmbeddingProvider, store_json::JsonDocumentStore};

/// Configuration for the knowledge subsystem.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Path to the knowledge base JSON file.
    pub kb_path: PathBuf,
    /// Base URL of the Ollama server.
    pub ollama_base_url: String,
    /// Model used for embeddings.
    pub embed_model: String,
    /// Soft character limit per chunk.
    pub max_chars: usize,
    /// Timeout for a single embedding request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            kb_path: PathBuf::from("data/knowledge_base.json"),
            ollama_base_url: "http://localhost:11434".into(),
            embed_model: "nomic-embed-text".into(),
            max_chars: 1000,
            request_timeout_secs: 60,
        }
    }
}

impl KnowledgeConfig {
    /// Build the embedding provider this config describes.
    #[must_use]
    pub fn provider(&self) -> OllamaEmbeddingProvider {
        OllamaEmbeddingProvider::new(self.ollama_base_url.as_str(), self.embed_model.as_str())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }

    /// Open the JSON document store this config describes, backed by the
    /// configured Ollama provider.
    pub async fn open_store(&self) -> JsonDocumentStore {
        JsonDocumentStore::open(&self.kb_path, Arc::new(self.provider())).await
    }
}
