//! Two-Stage Matching
//!
//! Stage 1 runs the match policy engine and keeps the top candidates.
//! Stage 2 rescores them jointly with the query, but only when the stage-1
//! scores leave the ranking open:
//! - fewer than `min_candidates` candidates: skip
//! - top score above `skip_above_score`: skip (clear winner)
//! - variance of the top `variance_window` scores above `max_top_variance`:
//!   skip (already well separated)
//!
//! Reranked results blend both stages:
//! `retrieval_weight * retrieval_score + rerank_weight * rerank_score`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::error::{MatchError, Result};
use crate::index::EntityIndex;
use crate::matching::{MatchEngine, MatchResult, MatchType, QueryType};

use super::cache::{cache_key, RerankCache};
use super::reranker::{RerankScorer, RerankerError};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Two-stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RerankConfig {
    /// Stage-1 candidates kept for reranking
    pub retrieval_top_k: usize,
    /// Results returned after stage 2
    pub final_top_k: usize,
    /// Below this many candidates reranking is skipped
    pub min_candidates: usize,
    /// A top score strictly above this is a clear winner
    pub skip_above_score: f32,
    /// Top-window variance strictly above this means already separated
    pub max_top_variance: f32,
    /// Number of leading scores the variance is computed over
    pub variance_window: usize,
    /// Weight of the stage-1 score in the blend
    pub retrieval_weight: f32,
    /// Weight of the stage-2 score in the blend
    pub rerank_weight: f32,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            retrieval_top_k: 20,
            final_top_k: 5,
            min_candidates: 4,
            skip_above_score: 0.95,
            max_top_variance: 0.01,
            variance_window: 5,
            retrieval_weight: 0.6,
            rerank_weight: 0.4,
        }
    }
}

impl RerankConfig {
    /// Check counts and blend weights
    pub fn validate(&self) -> Result<()> {
        if self.final_top_k == 0 || self.retrieval_top_k < self.final_top_k {
            return Err(MatchError::InvalidRerankConfig(format!(
                "need 0 < finalTopK ({}) <= retrievalTopK ({})",
                self.final_top_k, self.retrieval_top_k
            )));
        }
        if self.variance_window == 0 {
            return Err(MatchError::InvalidRerankConfig(
                "varianceWindow must be positive".to_string(),
            ));
        }
        let weights_ok = (0.0..=1.0).contains(&self.retrieval_weight)
            && (0.0..=1.0).contains(&self.rerank_weight)
            && (self.retrieval_weight + self.rerank_weight - 1.0).abs() < 1e-4;
        if !weights_ok {
            return Err(MatchError::InvalidRerankConfig(format!(
                "weights must be in [0, 1] and sum to 1, got {} + {}",
                self.retrieval_weight, self.rerank_weight
            )));
        }
        Ok(())
    }
}

/// Population variance
fn variance(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    let n = scores.len() as f32;
    let mean = scores.iter().sum::<f32>() / n;
    scores.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n
}

/// Decide whether stage 2 should run over these stage-1 scores (best first)
pub fn should_rerank(scores: &[f32], config: &RerankConfig) -> bool {
    if scores.len() < config.min_candidates {
        return false;
    }
    if scores.first().is_some_and(|&top| top > config.skip_above_score) {
        return false;
    }
    let window = &scores[..scores.len().min(config.variance_window)];
    variance(window) <= config.max_top_variance
}

// ============================================================================
// RESULTS
// ============================================================================

/// One result of a two-stage search
///
/// `result.similarity` is the final score: the blend when reranked, the
/// stage-1 score otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankedMatch {
    /// The match, carrying the final score
    #[serde(flatten)]
    pub result: MatchResult,
    /// Stage-1 score
    pub retrieval_score: f32,
    /// Stage-2 score, when stage 2 ran
    pub rerank_score: Option<f32>,
}

/// Output of one two-stage search
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoStageOutcome {
    /// Results, best first
    pub results: Vec<RerankedMatch>,
    /// Stage-1 classification of the result set
    pub match_type: MatchType,
    /// How the query was routed
    pub query_type: QueryType,
    /// Stage 2 ran (or its cached output was used)
    pub used_reranker: bool,
    /// Stage-2 output came from the cache
    pub from_cache: bool,
    /// Candidates handed from stage 1 to stage 2
    pub retrieval_candidates: usize,
    /// Wall-clock time of the whole call
    #[serde(skip)]
    pub elapsed: Duration,
}

impl TwoStageOutcome {
    /// Ids of the results in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.result.entity_id.as_str()).collect()
    }
}

/// Running totals across two-stage searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankStats {
    /// Searches performed
    pub searches: u64,
    /// Searches where stage 2 ran or was served from cache
    pub reranked: u64,
    /// Stage-2 lookups served from the cache
    pub cache_hits: u64,
    /// Stage-2 lookups that had to score
    pub cache_misses: u64,
}

impl RerankStats {
    /// reranked / searches
    pub fn reranked_share(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.reranked as f64 / self.searches as f64
        }
    }

    /// cache hits / cache lookups
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

// ============================================================================
// TWO-STAGE MATCHER
// ============================================================================

/// Match engine followed by an optional rerank stage
pub struct TwoStageMatcher<E: Embedder, S: RerankScorer> {
    engine: MatchEngine<E>,
    scorer: S,
    config: RerankConfig,
    searches: AtomicU64,
    reranked: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl<E: Embedder, S: RerankScorer> TwoStageMatcher<E, S> {
    /// Matcher with the default configuration
    pub fn new(engine: MatchEngine<E>, scorer: S) -> Self {
        Self {
            engine,
            scorer,
            config: RerankConfig::default(),
            searches: AtomicU64::new(0),
            reranked: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    /// Matcher with a custom configuration (validated)
    pub fn with_config(engine: MatchEngine<E>, scorer: S, config: RerankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(engine, scorer)
        })
    }

    /// Stage-1 engine
    pub fn engine(&self) -> &MatchEngine<E> {
        &self.engine
    }

    /// Stage-2 scorer
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Active configuration
    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    /// Totals since construction
    pub fn stats(&self) -> RerankStats {
        RerankStats {
            searches: self.searches.load(Ordering::Relaxed),
            reranked: self.reranked.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    /// Run stage 1, then stage 2 when the stage-1 scores call for it
    ///
    /// `cache` is optional; when given, stage-2 output for an identical
    /// query and candidate list is served from it.
    pub fn search(
        &self,
        query: &str,
        index: &EntityIndex,
        threshold: f32,
        cache: Option<&RerankCache>,
    ) -> Result<TwoStageOutcome> {
        let start = Instant::now();
        self.searches.fetch_add(1, Ordering::Relaxed);

        let stage_one = self.engine.search(query, index, threshold)?;
        let mut candidates = stage_one.results;
        candidates.truncate(self.config.retrieval_top_k);
        let retrieval_candidates = candidates.len();

        let scores: Vec<f32> = candidates.iter().map(|c| c.similarity).collect();
        if !should_rerank(&scores, &self.config) {
            tracing::debug!(candidates = retrieval_candidates, "Rerank skipped");
            let results = candidates
                .into_iter()
                .take(self.config.final_top_k)
                .map(|result| RerankedMatch {
                    retrieval_score: result.similarity,
                    rerank_score: None,
                    result,
                })
                .collect();
            return Ok(TwoStageOutcome {
                results,
                match_type: stage_one.match_type,
                query_type: stage_one.query_type,
                used_reranker: false,
                from_cache: false,
                retrieval_candidates,
                elapsed: start.elapsed(),
            });
        }

        self.reranked.fetch_add(1, Ordering::Relaxed);
        let key = cache_key(query, candidates.iter().map(|c| c.entity_id.as_str()));

        let cached = match cache {
            Some(cache) => cache.get(&key)?,
            None => None,
        };
        let from_cache = cached.is_some();

        let mut reranked = match cached {
            Some(hit) => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                hit
            }
            None => {
                if cache.is_some() {
                    self.cache_misses.fetch_add(1, Ordering::Relaxed);
                }
                let fresh = self.rerank(query, candidates)?;
                if let Some(cache) = cache {
                    cache.put(key, fresh.clone())?;
                }
                fresh
            }
        };
        reranked.truncate(self.config.final_top_k);

        tracing::debug!(
            scorer = self.scorer.name(),
            candidates = retrieval_candidates,
            from_cache,
            "Reranked"
        );

        Ok(TwoStageOutcome {
            results: reranked,
            match_type: stage_one.match_type,
            query_type: stage_one.query_type,
            used_reranker: true,
            from_cache,
            retrieval_candidates,
            elapsed: start.elapsed(),
        })
    }

    /// Score every candidate, blend, sort best first
    fn rerank(&self, query: &str, candidates: Vec<MatchResult>) -> Result<Vec<RerankedMatch>> {
        let documents: Vec<&str> = candidates.iter().map(|c| c.descriptor.as_str()).collect();
        let scores = self.scorer.score(query, &documents)?;
        if scores.len() != candidates.len() {
            return Err(MatchError::Rerank(RerankerError::RerankFailed(format!(
                "expected {} scores, got {}",
                candidates.len(),
                scores.len()
            ))));
        }

        let mut reranked: Vec<RerankedMatch> = candidates
            .into_iter()
            .zip(scores)
            .map(|(mut result, rerank_score)| {
                let rerank_score = rerank_score.clamp(0.0, 1.0);
                let retrieval_score = result.similarity;
                result.similarity = (self.config.retrieval_weight * retrieval_score
                    + self.config.rerank_weight * rerank_score)
                    .clamp(0.0, 1.0);
                RerankedMatch {
                    result,
                    retrieval_score,
                    rerank_score: Some(rerank_score),
                }
            })
            .collect();

        // Stable: blended ties keep stage-1 order
        reranked.sort_by(|a, b| b.result.similarity.total_cmp(&a.result.similarity));
        Ok(reranked)
    }
}

// ============================================================================
// TESTS
// ============================================================================
