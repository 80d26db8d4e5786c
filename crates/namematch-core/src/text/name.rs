//! Person-name decomposition
//!
//! Splits the head segment of a descriptor on whitespace and derives the
//! first / middle / last tokens plus one upper-cased initial per token.

use serde::{Deserialize, Serialize};

use super::extract_head;

/// Name components extracted from a descriptor's head segment
///
/// Invariants:
/// - `initials[i]` is the upper-cased first character of `parts[i]`
/// - `first == parts[0]` when `parts` is non-empty, else `""`
/// - `last == parts[len - 1]` when `parts.len() > 1`, else `""`
/// - `middle == parts[1..len - 1]` when `parts.len() > 2`, else empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameParts {
    /// The head segment, trimmed
    pub full: String,
    /// First token
    pub first: String,
    /// Last token (empty for single-token names)
    pub last: String,
    /// Tokens between first and last
    pub middle: Vec<String>,
    /// All tokens in order
    pub parts: Vec<String>,
    /// Upper-cased first character of every token
    pub initials: Vec<String>,
}

impl NameParts {
    /// Decompose an already-extracted name (no separator handling)
    pub fn from_name(name: &str) -> Self {
        let full = name.trim().to_string();
        let parts: Vec<String> = full.split_whitespace().map(str::to_string).collect();

        let first = parts.first().cloned().unwrap_or_default();
        let last = if parts.len() > 1 {
            parts[parts.len() - 1].clone()
        } else {
            String::new()
        };
        let middle = if parts.len() > 2 {
            parts[1..parts.len() - 1].to_vec()
        } else {
            Vec::new()
        };
        let initials = parts
            .iter()
            .filter_map(|p| p.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .collect();

        Self {
            full,
            first,
            last,
            middle,
            parts,
            initials,
        }
    }

    /// Number of whitespace tokens in the name
    pub fn token_count(&self) -> usize {
        self.parts.len()
    }

    /// The last name, or the first name for single-token names
    ///
    /// Used as the embedding target for last-name similarity so single-token
    /// names still get a meaningful vector.
    pub fn last_or_first(&self) -> &str {
        if self.last.is_empty() {
            &self.first
        } else {
            &self.last
        }
    }

    /// Case-insensitive membership test against every token
    pub fn has_part(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.parts.iter().any(|p| p.to_lowercase() == token)
    }
}

/// Extract name parts from a full descriptor ("Name - Role at Organization")
pub fn extract_name_parts(descriptor: &str) -> NameParts {
    NameParts::from_name(extract_head(descriptor))
}

/// True for a two-character initial such as "M." (letter followed by a period)
pub fn is_initial_form(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_alphabetic()
    )
}

// ============================================================================
// TESTS
// ============================================================================
