//! Second-Stage Scorers
//!
//! A rerank scorer looks at the query and each candidate descriptor together
//! and returns one relevance score in [0, 1] per candidate, in input order.
//!
//! - `TermOverlapScorer`: lexical feature blend, always available
//! - `CrossEncoderScorer`: Jina Reranker v1 Turbo via fastembed (`embeddings` feature)

#[cfg(feature = "embeddings")]
use std::sync::{Mutex, OnceLock};

#[cfg(feature = "embeddings")]
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};

// ============================================================================
// TYPES
// ============================================================================

/// Reranker error types
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum RerankerError {
    /// Failed to initialize the reranker model
    ModelInit(String),
    /// Failed to rerank
    RerankFailed(String),
    /// Invalid input
    InvalidInput(String),
}

impl std::fmt::Display for RerankerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RerankerError::ModelInit(e) => write!(f, "Reranker initialization failed: {}", e),
            RerankerError::RerankFailed(e) => write!(f, "Reranking failed: {}", e),
            RerankerError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for RerankerError {}

/// Joint query/candidate relevance scorer
pub trait RerankScorer: Send + Sync {
    /// One score in [0, 1] per document, in input order
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError>;

    /// Scorer identifier for logs
    fn name(&self) -> &str;
}

impl<S: RerankScorer + ?Sized> RerankScorer for &S {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        (**self).score(query, documents)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: RerankScorer + ?Sized> RerankScorer for Box<S> {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        (**self).score(query, documents)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// TERM OVERLAP
// ============================================================================

/// Weight of the "query appears verbatim in the descriptor" feature
const CONTAINMENT_WEIGHT: f32 = 0.4;
/// Weight of the share of query words found in the descriptor
const WORD_OVERLAP_WEIGHT: f32 = 0.3;
/// Weight of the shorter/longer length ratio
const LENGTH_RATIO_WEIGHT: f32 = 0.1;
/// Weight of the prefix feature (1.0 when the descriptor starts with the query, else 0.5)
const POSITION_WEIGHT: f32 = 0.2;

/// Lexical feature blend used when no cross-encoder is loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct TermOverlapScorer;

impl TermOverlapScorer {
    /// Score one document; `query` must be non-blank
    pub fn relevance(query: &str, document: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let doc_lower = document.to_lowercase();

        let containment = if doc_lower.contains(&query_lower) { 1.0 } else { 0.0 };

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        let doc_words: std::collections::HashSet<&str> = doc_lower.split_whitespace().collect();
        let mut unique_query: Vec<&str> = query_words.clone();
        unique_query.sort_unstable();
        unique_query.dedup();
        let word_overlap = if query_words.is_empty() {
            0.0
        } else {
            let shared = unique_query.iter().filter(|w| doc_words.contains(*w)).count();
            shared as f32 / query_words.len() as f32
        };

        let query_len = query.chars().count();
        let doc_len = document.chars().count();
        let length_ratio = match query_len.max(doc_len) {
            0 => 0.0,
            longest => query_len.min(doc_len) as f32 / longest as f32,
        };

        let position = if doc_lower.starts_with(&query_lower) { 1.0 } else { 0.5 };

        containment * CONTAINMENT_WEIGHT
            + word_overlap * WORD_OVERLAP_WEIGHT
            + length_ratio * LENGTH_RATIO_WEIGHT
            + position * POSITION_WEIGHT
    }
}

impl RerankScorer for TermOverlapScorer {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if query.trim().is_empty() {
            return Err(RerankerError::InvalidInput("Query cannot be empty".to_string()));
        }
        Ok(documents
            .iter()
            .map(|doc| Self::relevance(query, doc))
            .collect())
    }

    fn name(&self) -> &str {
        "term-overlap"
    }
}

// ============================================================================
// CROSS-ENCODER
// ============================================================================

/// Squash a cross-encoder logit into (0, 1)
pub fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit).exp())
}

/// Neural cross-encoder scorer (Jina Reranker v1 Turbo, ~150MB)
///
/// The model is NOT loaded at construction; it loads on first use or on an
/// explicit `init()`. A failed load is remembered and reported on every call.
#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub struct CrossEncoderScorer {
    model: OnceLock<Result<Mutex<TextRerank>, String>>,
}

#[cfg(feature = "embeddings")]
impl Default for CrossEncoderScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embeddings")]
impl CrossEncoderScorer {
    /// Scorer with a lazily loaded model
    pub fn new() -> Self {
        Self {
            model: OnceLock::new(),
        }
    }

    /// Load the model now instead of on first use
    pub fn init(&self) -> Result<(), RerankerError> {
        self.get_model().map(|_| ())
    }

    fn get_model(&self) -> Result<std::sync::MutexGuard<'_, TextRerank>, RerankerError> {
        let result = self.model.get_or_init(|| {
            let options = RerankInitOptions::new(RerankerModel::JINARerankerV1TurboEn)
                .with_show_download_progress(true)
                .with_cache_dir(crate::embeddings::get_cache_dir());

            match TextRerank::try_new(options) {
                Ok(model) => {
                    tracing::info!("Cross-encoder reranker loaded (Jina Reranker v1 Turbo)");
                    Ok(Mutex::new(model))
                }
                Err(e) => {
                    tracing::warn!("Cross-encoder unavailable: {}", e);
                    Err(e.to_string())
                }
            }
        });

        match result {
            Ok(model) => model
                .lock()
                .map_err(|e| RerankerError::ModelInit(format!("Lock poisoned: {}", e))),
            Err(err) => Err(RerankerError::ModelInit(err.clone())),
        }
    }
}

#[cfg(feature = "embeddings")]
impl RerankScorer for CrossEncoderScorer {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if query.trim().is_empty() {
            return Err(RerankerError::InvalidInput("Query cannot be empty".to_string()));
        }
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self.get_model()?;
        let ranked = model
            .rerank(query, documents, false, None)
            .map_err(|e| RerankerError::RerankFailed(e.to_string()))?;

        // fastembed returns results sorted by score; restore input order
        let mut scores = vec![0.0_f32; documents.len()];
        for rr in ranked {
            if let Some(slot) = scores.get_mut(rr.index) {
                *slot = sigmoid(rr.score);
            }
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        "jina-reranker-v1-turbo-en"
    }
}

// ============================================================================
// TESTS
// ============================================================================
