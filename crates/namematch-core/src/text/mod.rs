//! Text Processing Module
//!
//! Lexical building blocks for the match policy:
//! - Descriptor normalization and head-segment extraction
//! - Person-name decomposition (first / middle / last / initials)
//! - Longest-matching-blocks fuzzy ratio

mod fuzzy;
mod name;

pub use fuzzy::{fuzzy_ratio, matching_characters};
pub use name::{extract_name_parts, is_initial_form, NameParts};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Literal separators between the name/head segment of a descriptor and its tail
///
/// Matched case-sensitively; the earliest occurrence of any of them wins.
pub const HEAD_SEPARATORS: [&str; 3] = [" - ", " at ", " of "];

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Lower-case, collapse whitespace runs to a single space, trim both ends
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Return the portion of a descriptor before its first separator, trimmed
///
/// "John Smith - Professor of Physics at MIT" -> "John Smith". Without any
/// separator the whole descriptor (trimmed) is the head.
pub fn extract_head(descriptor: &str) -> &str {
    let cut = HEAD_SEPARATORS
        .iter()
        .filter_map(|sep| descriptor.find(sep))
        .min()
        .unwrap_or(descriptor.len());

    descriptor[..cut].trim()
}

/// Case-insensitive equality on normalized text
pub fn eq_normalized(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

// ============================================================================
// TESTS
// ============================================================================
