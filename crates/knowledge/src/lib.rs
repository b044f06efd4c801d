//! Knowledge base: documents → chunked → embedded → similarity search in a JSON store.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod embeddings_ollama;
pub mod error;
pub mod ingest;
pub mod store;
pub mod store_json;
