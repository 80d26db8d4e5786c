//! Test Data Factory
//!
//! Provides deterministic inputs for end-to-end tests:
//! - A lookup embedder with hand-placed vectors for chosen texts
//! - The sample people corpus and smaller purpose-built corpora
//! - Entity files on disk for loader-style tests

use std::collections::HashMap;
use std::io::Write;

use namematch_core::embeddings::{Embedder, Embedding, EmbeddingError, HashingEmbedder};
use namematch_core::{normalize, Entity};
use tempfile::NamedTempFile;

/// Hashed part of every lookup vector
const HASHED_DIMENSIONS: usize = 64;

/// Hand-placed part of every lookup vector
pub const RESERVED_DIMENSIONS: usize = 8;

/// Embedder with fixed vectors for registered texts
///
/// Vectors live in two disjoint blocks: registered texts use only the
/// reserved block, everything else is feature-hashed into the other block.
/// A registered text therefore has cosine 0 with every unregistered one, and
/// cosine between registered texts is exactly what the test placed. Lookup
/// is on the normalized text.
#[derive(Debug, Clone)]
pub struct LookupEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: HashingEmbedder,
}

impl Default for LookupEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupEmbedder {
    /// Embedder with nothing registered
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            fallback: HashingEmbedder::new(HASHED_DIMENSIONS),
        }
    }

    /// Register `text` with a reserved-block vector (padded or cut to size)
    pub fn with_vector(mut self, text: &str, reserved: &[f32]) -> Self {
        let mut block = vec![0.0; RESERVED_DIMENSIONS];
        for (slot, value) in block.iter_mut().zip(reserved) {
            *slot = *value;
        }
        self.table.insert(normalize(text), block);
        self
    }

    /// Register every text on the same unit axis (pairwise cosine 1.0)
    pub fn with_axis(mut self, texts: &[&str], axis: usize) -> Self {
        let mut unit = [0.0; RESERVED_DIMENSIONS];
        unit[axis % RESERVED_DIMENSIONS] = 1.0;
        for text in texts {
            self = self.with_vector(text, &unit);
        }
        self
    }

    fn embed(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0; HASHED_DIMENSIONS + RESERVED_DIMENSIONS];
        match self.table.get(&normalize(text)) {
            Some(reserved) => vector[HASHED_DIMENSIONS..].copy_from_slice(reserved),
            None => vector[..HASHED_DIMENSIONS].copy_from_slice(&self.fallback.embed(text).vector),
        }
        Embedding::new(vector)
    }
}

impl Embedder for LookupEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimensions(&self) -> usize {
        HASHED_DIMENSIONS + RESERVED_DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "lookup"
    }
}

/// Factory for test corpora
pub struct TestDataFactory;

impl TestDataFactory {
    /// The seven-person sample corpus
    pub fn people() -> Vec<Entity> {
        vec![
            Entity::new("1", "John Smith - Software Engineer at Google"),
            Entity::new("2", "John Smith - Professor of Physics at MIT"),
            Entity::new("3", "John Doe - Data Scientist at Microsoft"),
            Entity::new("4", "Jane Smith - Product Manager at Apple"),
            Entity::new("5", "Michael Johnson - Olympic Athlete"),
            Entity::new("6", "John Williams - Composer"),
            Entity::new("7", "Sarah Johnson - CEO of Tech Startup"),
        ]
    }

    /// The two namesakes
    pub fn john_smiths() -> Vec<Entity> {
        Self::people().into_iter().take(2).collect()
    }

    /// People whose middle names are spelled out or abbreviated
    pub fn middle_names() -> Vec<Entity> {
        vec![
            Entity::new("m1", "John Michael Smith - Surgeon at Mercy Hospital"),
            Entity::new("m2", "Jane Q. Public - City Council Member"),
            Entity::new("m3", "Mary Ann Evans - Novelist"),
            Entity::new("m4", "Robert Downey - Actor"),
        ]
    }

    /// Five researchers sharing one stage-1 vector with `query`
    pub fn researchers(query: &str) -> (Vec<Entity>, LookupEmbedder) {
        let entities = vec![
            Entity::new("a", "Alice Brown - Chemistry Researcher at Oxford"),
            Entity::new("b", "Bob Green - Physics Researcher at Boston University"),
            Entity::new("c", "Carol White - Biology Researcher at Stanford"),
            Entity::new("d", "Dan Black - History Lecturer at Yale"),
            Entity::new("e", "Eve Gray - Physics Teacher at Boston High"),
        ];

        // cos = 0.8 between the query and every descriptor
        let mut embedder = LookupEmbedder::new().with_vector(query, &[1.0, 0.0]);
        for entity in &entities {
            embedder = embedder.with_vector(&entity.descriptor, &[0.8, 0.6]);
        }
        (entities, embedder)
    }

    /// Write `entities` as a JSON array to a temporary file
    pub fn entities_file(entities: &[Entity]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        let json = serde_json::to_string(entities).expect("serialize entities");
        file.write_all(json.as_bytes()).expect("write entities");
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_texts_are_isolated() {
        let embedder = LookupEmbedder::new().with_axis(&["Olympic Athlete", "gold medalist"], 2);
        let vectors = embedder
            .encode(&["olympic  athlete", "Gold Medalist", "Michael Johnson"])
            .unwrap();

        assert!((vectors[0].cosine_similarity(&vectors[1]) - 1.0).abs() < 1e-6);
        assert_eq!(vectors[0].cosine_similarity(&vectors[2]), 0.0);
        assert_eq!(vectors[2].dimensions, embedder.dimensions());
    }
}
