use thiserror::Error;

/// Errors surfaced by the knowledge subsystem.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// A remote embedding call failed (network error, non-success status,
    /// or malformed response). Batch calls abort on the first failure and
    /// produce no partial results. `index` identifies the failing input
    /// within the batch when that is determinable.
    #[error("embedding request failed: {reason}")]
    EmbeddingFailed {
        index: Option<usize>,
        reason: String,
    },

    /// Two vectors of unequal length were compared. This is a contract
    /// violation, never silently coerced.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// The knowledge base file could not be written. The in-memory corpus
    /// may be ahead of the durable copy after this error.
    #[error("failed to persist knowledge base to {path}: {reason}")]
    PersistFailed { path: String, reason: String },

    /// An existing knowledge base file was unreadable or unparsable.
    /// Store construction catches this, logs a warning, and starts from
    /// an empty corpus rather than refusing to start.
    #[error("knowledge base at {path} is corrupt: {reason}")]
    CorpusLoadCorrupt { path: String, reason: String },
}
