//! Feature-hashing embedder
//!
//! Deterministic and model-free: lower-cased word unigrams and padded
//! character trigrams are hashed (FNV-1a) into a fixed number of buckets and
//! the result is L2-normalized. Lexically close strings land close together,
//! which is enough to exercise the semantic pass without model files.

use super::{Embedder, Embedding, EmbeddingError};

/// Default bucket count
pub const DEFAULT_HASHING_DIMENSIONS: usize = 256;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    name: String,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSIONS)
    }
}

impl HashingEmbedder {
    /// Create an embedder hashing into `dimensions` buckets (minimum 1)
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            dimensions,
            name: format!("hashing-{}", dimensions),
        }
    }

    /// Embed one text; empty or whitespace-only text yields the zero vector
    pub fn embed(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0_f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(word.as_bytes())] += WORD_WEIGHT;

            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            for window in padded.windows(3) {
                let gram: String = window.iter().collect();
                vector[self.bucket(gram.as_bytes())] += TRIGRAM_WEIGHT;
            }
        }

        let mut embedding = Embedding::new(vector);
        embedding.normalize();
        embedding
    }

    fn bucket(&self, bytes: &[u8]) -> usize {
        let mut hash = FNV_OFFSET;
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        (hash % self.dimensions as u64) as usize
    }
}

impl Embedder for HashingEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// TESTS
// ============================================================================
