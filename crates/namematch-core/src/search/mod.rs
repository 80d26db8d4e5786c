//! Two-Stage Search Module
//!
//! Optional second stage on top of the match policy engine:
//! - Rerank decision from the stage-1 score distribution
//! - Pluggable scorers (term overlap, cross-encoder)
//! - Caller-owned LRU cache of reranked result sets

mod cache;
mod reranker;
mod two_stage;

pub use cache::{cache_key, CacheKey, RerankCache, DEFAULT_CACHE_CAPACITY};
#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub use reranker::CrossEncoderScorer;
pub use reranker::{sigmoid, RerankScorer, RerankerError, TermOverlapScorer};
pub use two_stage::{
    should_rerank, RerankConfig, RerankStats, RerankedMatch, TwoStageMatcher, TwoStageOutcome,
};
