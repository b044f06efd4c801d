/// Directory ingestion: discover markdown and plain-text files and feed
/// them into a document store.
use std::path::Path;

use {
    anyhow::{Context, Result, bail},
    tracing::{info, warn},
    walkdir::WalkDir,
};

use crate::{
    chunker,
    store::{DocumentInput, DocumentStore},
};

/// Recursively scan `docs_dir` for `.md` and `.txt` files, chunk each one
/// (markdown-aware for `.md`), and ingest the combined batch.
///
/// Unreadable and empty files are logged and skipped; chunk indices are
/// scoped per file. Returns the number of chunks ingested.
pub async fn ingest_directory(
    store: &dyn DocumentStore,
    docs_dir: &Path,
    max_chars: usize,
) -> Result<usize> {
    if !docs_dir.is_dir() {
        bail!("not a directory: {}", docs_dir.display());
    }

    let mut batch: Vec<DocumentInput> = Vec::new();
    for entry in WalkDir::new(docs_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let markdown = ext.eq_ignore_ascii_case("md");
        if !markdown && !ext.eq_ignore_ascii_case("txt") {
            continue;
        }

        let source = entry.file_name().to_string_lossy().into_owned();
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(err) => {
                warn!(file = %entry.path().display(), error = %err, "skipping unreadable file");
                continue;
            },
        };
        if content.trim().is_empty() {
            continue;
        }

        let chunks = if markdown {
            chunker::chunk_markdown(&content, &source, max_chars)
        } else {
            chunker::chunk_plain_text(&content, &source, max_chars)
        };
        info!(file = %source, chunks = chunks.len(), "chunked document");
        batch.extend(chunks);
    }

    if batch.is_empty() {
        warn!(dir = %docs_dir.display(), "no ingestible documents found");
        return Ok(0);
    }

    let count = batch.len();
    store
        .ingest(batch)
        .await
        .context("failed to ingest documents")?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        embeddings::EmbeddingProvider, error::KnowledgeError, store_json::JsonDocumentStore,
    };

    struct ConstEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ConstEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect())
        }

        fn model_name(&self) -> &str {
            "const"
        }
    }

    #[tokio::test]
    async fn test_ingest_directory_picks_md_and_txt_only() {
        let docs = tempfile::tempdir().unwrap();
        std::fs::write(
            docs.path().join("guide.md"),
            "# Guide\n\nSome guidance text.",
        )
        .unwrap();
        std::fs::write(docs.path().join("notes.txt"), "Plain text notes.").unwrap();
        std::fs::write(docs.path().join("debug.log"), "ignored").unwrap();
        std::fs::write(docs.path().join("empty.md"), "   ").unwrap();

        let kb = tempfile::tempdir().unwrap();
        let store =
            JsonDocumentStore::open(kb.path().join("kb.json"), Arc::new(ConstEmbedder)).await;

        let ingested = ingest_directory(&store, docs.path(), 1000).await.unwrap();
        assert_eq!(ingested, 2);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_ingest_directory_rejects_non_directory() {
        let docs = tempfile::tempdir().unwrap();
        let file = docs.path().join("single.md");
        std::fs::write(&file, "# Hi").unwrap();

        let kb = tempfile::tempdir().unwrap();
        let store =
            JsonDocumentStore::open(kb.path().join("kb.json"), Arc::new(ConstEmbedder)).await;

        assert!(ingest_directory(&store, &file, 1000).await.is_err());
        assert!(
            ingest_directory(&store, &docs.path().join("missing"), 1000)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_ingest_empty_directory_is_ok_and_zero() {
        let docs = tempfile::tempdir().unwrap();
        let kb = tempfile::tempdir().unwrap();
        let store =
            JsonDocumentStore::open(kb.path().join("kb.json"), Arc::new(ConstEmbedder)).await;

        let ingested = ingest_directory(&store, docs.path(), 1000).await.unwrap();
        assert_eq!(ingested, 0);
        assert_eq!(store.count().await, 0);
    }
}
