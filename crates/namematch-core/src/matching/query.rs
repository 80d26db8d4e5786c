//! Query classification
//!
//! Routes a raw query to the partial-name branch or the full-name / semantic
//! branch. Recomputed per query, never cached.

use serde::{Deserialize, Serialize};

/// Shape of a raw query string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Zero or one whitespace token ("John", "J")
    SingleToken,
    /// Two name-shaped tokens ("John Smith", "john smith")
    FullName,
    /// Anything else ("Software Engineer at Google", "John M. Smith")
    Semantic,
}

impl QueryType {
    /// Label used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::SingleToken => "single_token",
            QueryType::FullName => "full_name",
            QueryType::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query by token count and capitalization
pub fn classify_query(query: &str) -> QueryType {
    let tokens: Vec<&str> = query.split_whitespace().collect();

    match tokens.as_slice() {
        [] | [_] => QueryType::SingleToken,
        [a, b] if is_name_shaped(a) && is_name_shaped(b) => QueryType::FullName,
        _ => QueryType::Semantic,
    }
}

/// Capitalized first letter, or fully lower-case
fn is_name_shaped(token: &str) -> bool {
    let capitalized = token.chars().next().is_some_and(char::is_uppercase);
    let lower_case =
        token.chars().any(char::is_lowercase) && !token.chars().any(char::is_uppercase);
    capitalized || lower_case
}

// ============================================================================
// TESTS
// ============================================================================
