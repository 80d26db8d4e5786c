//! Entity Index
//!
//! Per-corpus structure built once from an ordered entity list. Each entry
//! holds the normalized descriptor, the extracted name parts and every
//! embedding variant the match policy compares against. Entries are
//! positionally aligned with the source list; there is no incremental
//! update, a changed corpus means a rebuilt index.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::embeddings::{encode_checked, Embedder, Embedding};
use crate::error::{MatchError, Result};
use crate::text::{extract_name_parts, normalize, NameParts};

// ============================================================================
// ENTITY
// ============================================================================

/// A matchable record: unique id plus a free-text descriptor
/// ("Name - Role at Organization")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: String,
    /// Free-text descriptor
    pub descriptor: String,
}

impl Entity {
    /// Create an entity
    pub fn new(id: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            descriptor: descriptor.into(),
        }
    }
}

// ============================================================================
// INDEX ENTRY
// ============================================================================

/// Embedding variants precomputed for one entity
#[derive(Debug, Clone)]
pub struct EntityEmbeddings {
    /// Raw descriptor
    pub descriptor: Embedding,
    /// Normalized descriptor
    pub normalized_descriptor: Embedding,
    /// Head segment (name only)
    pub name: Embedding,
    /// Normalized head segment
    pub normalized_name: Embedding,
    /// First name
    pub first_name: Embedding,
    /// Last name (first name for single-token names)
    pub last_name: Embedding,
}

/// Derived data for one entity
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// The source entity
    pub entity: Entity,
    /// Lower-cased, whitespace-collapsed descriptor
    pub normalized: String,
    /// Name components of the head segment
    pub name_parts: NameParts,
    /// Precomputed embedding variants
    pub embeddings: EntityEmbeddings,
}

// ============================================================================
// ENTITY INDEX
// ============================================================================

/// Read-only index over an entity corpus
#[derive(Debug, Clone)]
pub struct EntityIndex {
    entries: Vec<IndexEntry>,
    model_name: String,
    dimensions: usize,
}

impl EntityIndex {
    /// Validate `entities` and precompute name parts and embeddings
    ///
    /// Fails with `InvalidEntity` on an empty id, a blank descriptor or a
    /// duplicate id, and with `Embedder` when encoding fails.
    pub fn build<E: Embedder + ?Sized>(entities: &[Entity], embedder: &E) -> Result<Self> {
        validate(entities)?;

        let name_parts: Vec<NameParts> = entities
            .iter()
            .map(|e| extract_name_parts(&e.descriptor))
            .collect();
        let normalized: Vec<String> = entities.iter().map(|e| normalize(&e.descriptor)).collect();
        let normalized_names: Vec<String> = name_parts.iter().map(|p| normalize(&p.full)).collect();

        let descriptors: Vec<&str> = entities.iter().map(|e| e.descriptor.as_str()).collect();
        let normalized_refs: Vec<&str> = normalized.iter().map(String::as_str).collect();
        let names: Vec<&str> = name_parts.iter().map(|p| p.full.as_str()).collect();
        let normalized_name_refs: Vec<&str> = normalized_names.iter().map(String::as_str).collect();
        let first_names: Vec<&str> = name_parts.iter().map(|p| p.first.as_str()).collect();
        let last_names: Vec<&str> = name_parts.iter().map(NameParts::last_or_first).collect();

        let descriptor_vecs = encode_checked(embedder, &descriptors)?;
        let normalized_vecs = encode_checked(embedder, &normalized_refs)?;
        let name_vecs = encode_checked(embedder, &names)?;
        let normalized_name_vecs = encode_checked(embedder, &normalized_name_refs)?;
        let first_vecs = encode_checked(embedder, &first_names)?;
        let last_vecs = encode_checked(embedder, &last_names)?;

        // encode_checked guarantees one vector per entity in every batch
        let variants = descriptor_vecs
            .into_iter()
            .zip(normalized_vecs)
            .zip(name_vecs)
            .zip(normalized_name_vecs)
            .zip(first_vecs)
            .zip(last_vecs)
            .map(
                |(((((descriptor, normalized_descriptor), name), normalized_name), first_name), last_name)| {
                    EntityEmbeddings {
                        descriptor,
                        normalized_descriptor,
                        name,
                        normalized_name,
                        first_name,
                        last_name,
                    }
                },
            );

        let entries: Vec<IndexEntry> = entities
            .iter()
            .zip(normalized)
            .zip(name_parts)
            .zip(variants)
            .map(|(((entity, normalized), name_parts), embeddings)| IndexEntry {
                entity: entity.clone(),
                normalized,
                name_parts,
                embeddings,
            })
            .collect();

        tracing::info!(
            entities = entries.len(),
            model = embedder.model_name(),
            dimensions = embedder.dimensions(),
            "Entity index built"
        );

        Ok(Self {
            entries,
            model_name: embedder.model_name().to_string(),
            dimensions: embedder.dimensions(),
        })
    }

    /// Entries in source order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entry at `position`
    pub fn get(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    /// Number of indexed entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no entities
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Model that produced the stored embeddings
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Dimensions of the stored embeddings
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn validate(entities: &[Entity]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entities.len());

    for (position, entity) in entities.iter().enumerate() {
        if entity.id.is_empty() {
            return Err(MatchError::InvalidEntity {
                position,
                reason: "missing id".to_string(),
            });
        }
        if entity.descriptor.trim().is_empty() {
            return Err(MatchError::InvalidEntity {
                position,
                reason: format!("entity '{}' has no descriptor", entity.id),
            });
        }
        if !seen.insert(entity.id.as_str()) {
            return Err(MatchError::InvalidEntity {
                position,
                reason: format!("duplicate id '{}'", entity.id),
            });
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
