//! Semantic Embeddings Module
//!
//! The embedder is an external collaborator: anything that maps a batch of
//! strings to fixed-length vectors, one per input, in order, deterministically.
//!
//! Provided implementations:
//! - `HashingEmbedder`: dependency-free feature hashing (offline, tests, benches)
//! - `FastEmbedder`: local ONNX inference via fastembed (`embeddings` feature)

mod hashing;
#[cfg(feature = "embeddings")]
mod local;
mod types;

pub use hashing::{HashingEmbedder, DEFAULT_HASHING_DIMENSIONS};
#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub use local::{FastEmbedder, BATCH_SIZE, DEFAULT_MODEL_NAME, MAX_TEXT_LENGTH};
#[cfg(feature = "embeddings")]
pub(crate) use local::get_cache_dir;
pub use types::{cosine_similarity, Embedding, EmbeddingError};

use std::sync::Arc;

/// Text-to-vector encoder
///
/// `encode` must return exactly one vector per input text, in input order.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Dimensions of every returned vector
    fn dimensions(&self) -> usize;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Encode a single text
    fn encode_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut vectors = self.encode(&[text])?;
        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            got => Err(EmbeddingError::CountMismatch { expected: 1, got }),
        }
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).encode(texts)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).encode(texts)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).encode(texts)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Encode `texts` and verify the embedder honoured the one-vector-per-text contract
pub fn encode_checked<E: Embedder + ?Sized>(
    embedder: &E,
    texts: &[&str],
) -> Result<Vec<Embedding>, EmbeddingError> {
    if texts.is_empty() {
        return Ok(vec![]);
    }

    let vectors = embedder.encode(texts)?;
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: texts.len(),
            got: vectors.len(),
        });
    }
    Ok(vectors)
}
