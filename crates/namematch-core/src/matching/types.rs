//! Match results and labels

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::QueryType;

/// How an individual result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Query equals the whole descriptor
    ExactDescriptor,
    /// Query name equals the candidate name
    ExactFullName,
    /// Query gives first + last, candidate also has middle names
    NameWithoutMiddle,
    /// Same first, middle and last names
    NameWithMiddle,
    /// Query middle initials match candidate middle names
    NameWithMiddleInitial,
    /// Candidate middle initials match query middle names
    NameMatchesMiddleInitial,
    /// Single letter equal to the first initial
    FirstInitial,
    /// Single letter equal to the last initial
    LastInitial,
    /// Single letter equal to an interior initial
    MiddleInitial,
    /// Single letter matching none of the initials (score 0.0)
    NoInitial,
    /// Single token equal to the first name
    ExactFirstName,
    /// Single token equal to the last name
    ExactLastName,
    /// Single token equal to some name token
    ExactNamePart,
    /// Damped embedding similarity against first / last name
    SemanticName,
    /// Typo-tolerant match on the full name
    Fuzzy,
    /// Embedding similarity against the descriptor variants
    Semantic,
    /// Query text contained in the descriptor
    Substring,
}

impl MatchKind {
    /// Label used in logs, JSON and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::ExactDescriptor => "exact_descriptor",
            MatchKind::ExactFullName => "exact_full_name",
            MatchKind::NameWithoutMiddle => "name_without_middle",
            MatchKind::NameWithMiddle => "name_with_middle",
            MatchKind::NameWithMiddleInitial => "name_with_middle_initial",
            MatchKind::NameMatchesMiddleInitial => "name_matches_middle_initial",
            MatchKind::FirstInitial => "first_initial",
            MatchKind::LastInitial => "last_initial",
            MatchKind::MiddleInitial => "middle_initial",
            MatchKind::NoInitial => "no_initial",
            MatchKind::ExactFirstName => "exact_first_name",
            MatchKind::ExactLastName => "exact_last_name",
            MatchKind::ExactNamePart => "exact_name_part",
            MatchKind::SemanticName => "semantic_name",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Semantic => "semantic",
            MatchKind::Substring => "substring",
        }
    }

    /// True for labels produced by the exact pass
    pub fn is_exact_pass(&self) -> bool {
        matches!(
            self,
            MatchKind::ExactDescriptor
                | MatchKind::ExactFullName
                | MatchKind::NameWithoutMiddle
                | MatchKind::NameWithMiddle
                | MatchKind::NameWithMiddleInitial
                | MatchKind::NameMatchesMiddleInitial
        )
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall classification of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// One confident answer (or an exact-pass hit set)
    Exact,
    /// Several entities share the queried name token
    Partial,
    /// No single dominant answer
    Ambiguous,
}

impl MatchType {
    /// Label used in logs, JSON and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Ambiguous => "ambiguous",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Matched entity id
    pub entity_id: String,
    /// Matched entity descriptor
    pub descriptor: String,
    /// Score in [0, 1]
    pub similarity: f32,
    /// How the match was produced
    pub match_kind: MatchKind,
    /// Position of the entity in the indexed corpus
    pub position: usize,
}

/// Ranked results of one search call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Results, best first; ties keep corpus order
    pub results: Vec<MatchResult>,
    /// Overall classification
    pub match_type: MatchType,
    /// How the query was routed
    pub query_type: QueryType,
    /// Wall-clock time spent in the call
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Ids of the results in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.entity_id.as_str()).collect()
    }

    /// Best result, if any
    pub fn top(&self) -> Option<&MatchResult> {
        self.results.first()
    }
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Stable sort by score, highest first
pub(crate) fn sort_by_score(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

// ============================================================================
// TESTS
// ============================================================================
