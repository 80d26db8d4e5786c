//! Match Policy Module
//!
//! Query classification, profiles, result types and the engine that
//! combines exact, fuzzy, partial-name and semantic evidence.

mod engine;
mod profile;
mod query;
mod types;

pub use engine::MatchEngine;
pub use profile::{MatchingProfile, DEFAULT_THRESHOLD};
pub use query::{classify_query, QueryType};
pub use types::{MatchKind, MatchResult, MatchType, SearchOutcome};
