//! Crate-level error type

use thiserror::Error;

use crate::embeddings::EmbeddingError;
use crate::search::RerankerError;

/// Errors surfaced by index construction, search and reranking
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MatchError {
    /// An entity failed validation while building an index
    #[error("Invalid entity at position {position}: {reason}")]
    InvalidEntity {
        /// Position of the offending entity in the input sequence
        position: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The embedder failed; the affected call is aborted
    #[error("Embedder failure: {0}")]
    Embedder(#[from] EmbeddingError),

    /// A matching profile violates the score ordering or value ranges
    #[error("Invalid matching profile: {0}")]
    InvalidProfile(String),

    /// A two-stage configuration has inconsistent counts or weights
    #[error("Invalid rerank config: {0}")]
    InvalidRerankConfig(String),

    /// The second-stage scorer failed
    #[error("Reranking failed: {0}")]
    Rerank(#[from] RerankerError),

    /// The rerank cache mutex was poisoned by a panicking holder
    #[error("Rerank cache lock poisoned")]
    CacheLock,
}

/// Result alias for matching operations
pub type Result<T> = std::result::Result<T, MatchError>;
