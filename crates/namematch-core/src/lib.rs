//! # Namematch Core
//!
//! Entity matching engine: given a free-text query and a corpus of entity
//! descriptors ("Name - Role at Organization"), decide which entities the
//! query refers to and how confidently.
//!
//! - **Exact pass**: descriptor and full-name equality, middle names and
//!   middle initials ("John M. Smith" finds "John Michael Smith")
//! - **Fuzzy pass**: longest-matching-blocks ratio for typos ("Jhon Smith")
//! - **Partial names**: single tokens and single letters against first,
//!   last and middle names and their initials
//! - **Semantic pass**: embedding similarity against descriptor and name variants
//! - **Two-stage reranking**: optional cross-encoder or term-overlap rescoring
//!   of tightly clustered candidates, with a caller-owned LRU cache
//!
//! ## Quick Start
//!
//! ```rust
//! use namematch_core::{Entity, HashingEmbedder, MatchEngine, MatchType, DEFAULT_THRESHOLD};
//!
//! let engine = MatchEngine::new(HashingEmbedder::default());
//! let index = engine.build_index(&[
//!     Entity::new("1", "John Smith - Software Engineer at Google"),
//!     Entity::new("2", "John Smith - Professor of Physics at MIT"),
//!     Entity::new("3", "Jane Doe - Data Scientist at Microsoft"),
//! ])?;
//!
//! let outcome = engine.search("John Smith", &index, DEFAULT_THRESHOLD)?;
//! assert_eq!(outcome.match_type, MatchType::Exact);
//! assert_eq!(outcome.ids(), vec!["1", "2"]);
//! # Ok::<(), namematch_core::MatchError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings`: local ONNX inference with fastembed (`FastEmbedder`,
//!   `CrossEncoderScorer`). Without it only the hashing embedder and the
//!   term-overlap scorer are available.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod embeddings;
pub mod error;
pub mod index;
pub mod matching;
pub mod search;
pub mod text;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use error::{MatchError, Result};

pub use embeddings::{
    cosine_similarity, encode_checked, Embedder, Embedding, EmbeddingError, HashingEmbedder,
};

#[cfg(feature = "embeddings")]
pub use embeddings::FastEmbedder;

pub use index::{Entity, EntityIndex, IndexEntry};

pub use matching::{
    classify_query, MatchEngine, MatchKind, MatchResult, MatchType, MatchingProfile, QueryType,
    SearchOutcome, DEFAULT_THRESHOLD,
};

pub use search::{
    RerankCache, RerankConfig, RerankScorer, RerankStats, RerankedMatch, RerankerError,
    TermOverlapScorer, TwoStageMatcher, TwoStageOutcome,
};

#[cfg(feature = "embeddings")]
pub use search::CrossEncoderScorer;

pub use text::{extract_name_parts, fuzzy_ratio, normalize, NameParts};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Embedder, Entity, EntityIndex, HashingEmbedder, MatchEngine, MatchError, MatchKind,
        MatchResult, MatchType, MatchingProfile, QueryType, Result, SearchOutcome,
        DEFAULT_THRESHOLD,
    };

    pub use crate::{RerankCache, RerankConfig, TermOverlapScorer, TwoStageMatcher};

    #[cfg(feature = "embeddings")]
    pub use crate::{CrossEncoderScorer, FastEmbedder};
}
