//! Match Policy Engine
//!
//! Decides, per query, between an exact answer, a fuzzy answer, a
//! partial-name answer or a semantically ranked list:
//!
//! 1. Classify the query (single token / full name / semantic)
//! 2. Single token: initials, exact name tokens, then damped name similarity
//! 3. Otherwise: exact pass (short-circuits), fuzzy pass, semantic pass,
//!    threshold, then collapse to one result if it clearly dominates
//!
//! The engine holds no mutable state; one engine and one index can serve
//! concurrent searches.

use std::collections::HashMap;
use std::time::Instant;

use crate::embeddings::{encode_checked, Embedder, Embedding, EmbeddingError};
use crate::error::{MatchError, Result};
use crate::index::{Entity, EntityIndex, IndexEntry};
use crate::text::{
    eq_normalized, extract_name_parts, fuzzy_ratio, is_initial_form, normalize, NameParts,
};

use super::types::sort_by_score;
use super::{classify_query, MatchKind, MatchResult, MatchType, MatchingProfile, QueryType, SearchOutcome};

/// Multi-strategy entity matcher over a caller-supplied embedder
pub struct MatchEngine<E: Embedder> {
    embedder: E,
    profile: MatchingProfile,
}

impl<E: Embedder> MatchEngine<E> {
    /// Engine with the default multi-strategy profile
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            profile: MatchingProfile::default(),
        }
    }

    /// Engine with a custom profile (validated)
    pub fn with_profile(embedder: E, profile: MatchingProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self { embedder, profile })
    }

    /// Active profile
    pub fn profile(&self) -> &MatchingProfile {
        &self.profile
    }

    /// The embedder used for queries and index construction
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Build an index over `entities` with this engine's embedder
    pub fn build_index(&self, entities: &[Entity]) -> Result<EntityIndex> {
        EntityIndex::build(entities, &self.embedder)
    }

    /// Rank the indexed entities against `query`
    ///
    /// An empty index or a blank query yields no results and `Ambiguous`
    /// without touching the embedder. Embedder failures abort the call.
    pub fn search(&self, query: &str, index: &EntityIndex, threshold: f32) -> Result<SearchOutcome> {
        let start = Instant::now();
        let query_type = classify_query(query);

        if index.is_empty() || query.trim().is_empty() {
            tracing::debug!(%query_type, "Empty index or blank query, nothing to match");
            return Ok(SearchOutcome {
                results: vec![],
                match_type: MatchType::Ambiguous,
                query_type,
                elapsed: start.elapsed(),
            });
        }

        if index.model_name() != self.embedder.model_name() {
            tracing::warn!(
                index_model = index.model_name(),
                query_model = self.embedder.model_name(),
                "Index was built with a different embedder; semantic scores are unreliable"
            );
        }

        let (results, match_type) = match query_type {
            QueryType::SingleToken if self.profile.enable_partial_names => {
                self.partial_name_search(query.trim(), index, threshold)?
            }
            _ => self.full_search(query, index, threshold)?,
        };

        tracing::debug!(
            %query_type,
            %match_type,
            results = results.len(),
            "Search complete"
        );

        Ok(SearchOutcome {
            results,
            match_type,
            query_type,
            elapsed: start.elapsed(),
        })
    }

    // ========================================================================
    // SINGLE-TOKEN BRANCH
    // ========================================================================

    fn partial_name_search(
        &self,
        token: &str,
        index: &EntityIndex,
        threshold: f32,
    ) -> Result<(Vec<MatchResult>, MatchType)> {
        let lower = token.to_lowercase();
        let single_letter = token.chars().count() == 1;
        let mut query_vec: Option<Embedding> = None;
        let mut results = Vec::new();

        for (position, entry) in index.entries().iter().enumerate() {
            let parts = &entry.name_parts;

            let scored = if single_letter {
                Some(self.initial_score(token, parts))
            } else if lower == parts.first.to_lowercase() {
                Some((self.profile.exact_first_name_score, MatchKind::ExactFirstName))
            } else if !parts.last.is_empty() && lower == parts.last.to_lowercase() {
                Some((self.profile.exact_last_name_score, MatchKind::ExactLastName))
            } else if parts.has_part(token) {
                Some((self.profile.exact_name_part_score, MatchKind::ExactNamePart))
            } else {
                if query_vec.is_none() {
                    query_vec = Some(self.embedder.encode_one(token)?);
                }
                query_vec.as_ref().map(|q| {
                    let similarity = q
                        .match_score(&entry.embeddings.first_name)
                        .max(q.match_score(&entry.embeddings.last_name));
                    (
                        similarity * self.profile.semantic_partial_damping,
                        MatchKind::SemanticName,
                    )
                })
            };

            if let Some((score, kind)) = scored {
                if score >= threshold {
                    results.push(to_result(entry, position, score, kind));
                }
            }
        }

        sort_by_score(&mut results);
        let match_type = if results.len() > 1 {
            MatchType::Partial
        } else {
            MatchType::Exact
        };

        tracing::debug!(token, results = results.len(), "Partial-name branch");
        Ok((results, match_type))
    }

    /// Score a single-letter query against the candidate's initials
    ///
    /// The first matching position decides; no match scores 0.0.
    fn initial_score(&self, letter: &str, parts: &NameParts) -> (f32, MatchKind) {
        let upper = letter.to_uppercase();
        let last = parts.initials.len().saturating_sub(1);

        match parts.initials.iter().position(|initial| *initial == upper) {
            Some(0) => (self.profile.first_initial_score, MatchKind::FirstInitial),
            Some(i) if i == last => (self.profile.last_initial_score, MatchKind::LastInitial),
            Some(_) => (self.profile.middle_initial_score, MatchKind::MiddleInitial),
            None => (0.0, MatchKind::NoInitial),
        }
    }

    // ========================================================================
    // FULL-NAME / SEMANTIC BRANCH
    // ========================================================================

    fn full_search(
        &self,
        query: &str,
        index: &EntityIndex,
        threshold: f32,
    ) -> Result<(Vec<MatchResult>, MatchType)> {
        // a. exact pass
        if self.profile.enable_exact_pass {
            let exact = self.exact_pass(query, index);
            if !exact.is_empty() {
                tracing::debug!(results = exact.len(), "Exact pass matched");
                return Ok((exact, MatchType::Exact));
            }
        }

        // b. fuzzy pass: position -> damped ratio
        let fuzzy: HashMap<usize, f32> = if self.profile.enable_fuzzy {
            index
                .entries()
                .iter()
                .enumerate()
                .filter_map(|(position, entry)| {
                    let ratio = fuzzy_ratio(query.trim(), &entry.name_parts.full);
                    (ratio >= self.profile.fuzzy_min_ratio)
                        .then_some((position, ratio * self.profile.fuzzy_damping))
                })
                .collect()
        } else {
            HashMap::new()
        };
        if !fuzzy.is_empty() {
            tracing::debug!(candidates = fuzzy.len(), "Fuzzy pass matched");
        }

        // c. semantic pass
        let semantic = self.semantic_scores(query, index)?;

        let mut results: Vec<MatchResult> = index
            .entries()
            .iter()
            .zip(&semantic)
            .enumerate()
            .filter_map(|(position, (entry, semantic_score))| {
                let (score, kind) = match fuzzy.get(&position) {
                    Some(fuzzy_score) => (*fuzzy_score, MatchKind::Fuzzy),
                    None => (*semantic_score, MatchKind::Semantic),
                };
                (score >= threshold).then(|| to_result(entry, position, score, kind))
            })
            .collect();

        if results.is_empty() && self.profile.substring_fallback {
            let needle = normalize(query);
            results = index
                .entries()
                .iter()
                .zip(&semantic)
                .enumerate()
                .filter(|(_, (entry, _))| entry.normalized.contains(&needle))
                .map(|(position, (entry, score))| {
                    to_result(entry, position, *score, MatchKind::Substring)
                })
                .collect();
            sort_by_score(&mut results);
            tracing::debug!(results = results.len(), "Substring fallback");
            return Ok((results, MatchType::Ambiguous));
        }

        // d. rank and collapse
        sort_by_score(&mut results);
        let match_type = if self.dominates(&results) {
            results.truncate(1);
            MatchType::Exact
        } else {
            MatchType::Ambiguous
        };

        Ok((results, match_type))
    }

    /// Exact descriptor equality, then the name rules, per entity
    fn exact_pass(&self, query: &str, index: &EntityIndex) -> Vec<MatchResult> {
        let query_parts = extract_name_parts(query);
        let query_normalized = normalize(query);

        let mut matches: Vec<MatchResult> = index
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let (score, kind) = if query_normalized == entry.normalized {
                    (1.0, MatchKind::ExactDescriptor)
                } else {
                    self.name_rule(&query_parts, &entry.name_parts)?
                };
                Some(to_result(entry, position, score, kind))
            })
            .collect();

        sort_by_score(&mut matches);
        matches
    }

    /// Name equality allowing for omitted middle names and middle initials
    fn name_rule(&self, query: &NameParts, candidate: &NameParts) -> Option<(f32, MatchKind)> {
        if !query.full.is_empty() && eq_normalized(&query.full, &candidate.full) {
            return Some((1.0, MatchKind::ExactFullName));
        }

        if !self.profile.enable_middle_name_rule || query.token_count() < 2 {
            return None;
        }

        let first_matches = query.first.to_lowercase() == candidate.first.to_lowercase();
        let last_matches = query.last.to_lowercase() == candidate.last.to_lowercase();
        if !(first_matches && last_matches) {
            return None;
        }

        if query.token_count() == 2 {
            return (candidate.token_count() > 2)
                .then_some((self.profile.name_without_middle_score, MatchKind::NameWithoutMiddle));
        }

        let query_middle: Vec<String> = query.middle.iter().map(|m| m.to_lowercase()).collect();
        let candidate_middle: Vec<String> =
            candidate.middle.iter().map(|m| m.to_lowercase()).collect();

        if query_middle == candidate_middle {
            return Some((self.profile.name_with_middle_score, MatchKind::NameWithMiddle));
        }

        // "John M. Smith" against "John Michael Smith"
        if query_middle.iter().all(|m| is_initial_form(m))
            && first_letters(&query_middle) == first_letters(&candidate_middle)
        {
            return Some((
                self.profile.middle_initial_match_score,
                MatchKind::NameWithMiddleInitial,
            ));
        }

        // "John Michael Smith" against "John M. Smith"
        if candidate_middle.iter().all(|m| is_initial_form(m))
            && first_letters(&candidate_middle) == first_letters(&query_middle)
        {
            return Some((
                self.profile.middle_initial_match_score,
                MatchKind::NameMatchesMiddleInitial,
            ));
        }

        None
    }

    /// Best clipped cosine per entity across the query and descriptor variants
    fn semantic_scores(&self, query: &str, index: &EntityIndex) -> Result<Vec<f32>> {
        let query_normalized = normalize(query);
        let vectors = encode_checked(&self.embedder, &[query, query_normalized.as_str()])?;
        let [raw, normalized] = vectors.as_slice() else {
            return Err(MatchError::Embedder(EmbeddingError::CountMismatch {
                expected: 2,
                got: vectors.len(),
            }));
        };

        Ok(index
            .entries()
            .iter()
            .map(|entry| {
                let e = &entry.embeddings;
                raw.match_score(&e.descriptor)
                    .max(normalized.match_score(&e.normalized_descriptor))
                    .max(raw.match_score(&e.name))
                    .max(normalized.match_score(&e.normalized_name))
            })
            .collect())
    }

    /// Single result above the dominance score, or a top result that leads
    /// the runner-up by more than the margin
    fn dominates(&self, results: &[MatchResult]) -> bool {
        match results {
            [only] => only.similarity >= self.profile.dominance_score,
            [top, runner_up, ..] => {
                top.similarity >= self.profile.dominance_score
                    && top.similarity - runner_up.similarity > self.profile.dominance_margin
            }
            [] => false,
        }
    }
}

fn first_letters(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| t.chars().next())
        .map(|c| c.to_uppercase().collect())
        .collect()
}

fn to_result(entry: &IndexEntry, position: usize, similarity: f32, kind: MatchKind) -> MatchResult {
    MatchResult {
        entity_id: entry.entity.id.clone(),
        descriptor: entry.entity.descriptor.clone(),
        similarity,
        match_kind: kind,
        position,
    }
}

// ============================================================================
// TESTS
// ============================================================================
