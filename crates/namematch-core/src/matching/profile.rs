//! Matching profiles
//!
//! Every design constant and strategy toggle of the match policy lives here,
//! so the multi-strategy policy and the pure-semantic baseline are two
//! configurations of one engine rather than two engines.
//!
//! The constants encode a fixed preference ordering: exact lexical identity,
//! then fuzzy / typo matches, then partial-name and initial matches, then
//! open-ended semantic similarity. `validate()` rejects profiles that break it.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Default score threshold for `search`
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Strategy toggles and scoring constants for the match policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchingProfile {
    /// Route single-token queries to the partial-name branch
    pub enable_partial_names: bool,
    /// Run the exact pass (descriptor / full-name / middle-name rules)
    pub enable_exact_pass: bool,
    /// Consider middle names and middle initials in the exact pass
    pub enable_middle_name_rule: bool,
    /// Run the fuzzy pass before the semantic pass
    pub enable_fuzzy: bool,
    /// When the semantic pass keeps nothing, fall back to substring containment
    pub substring_fallback: bool,

    /// Minimum fuzzy ratio for a candidate to enter the fuzzy pass
    pub fuzzy_min_ratio: f32,
    /// Multiplier applied to fuzzy ratios so fuzzy never outranks exact
    pub fuzzy_damping: f32,
    /// Multiplier applied to semantic first/last-name similarity
    pub semantic_partial_damping: f32,

    /// Single-letter query equal to the first initial
    pub first_initial_score: f32,
    /// Single-letter query equal to the last initial
    pub last_initial_score: f32,
    /// Single-letter query equal to an interior initial
    pub middle_initial_score: f32,
    /// Single-token query equal to the first name
    pub exact_first_name_score: f32,
    /// Single-token query equal to the last name
    pub exact_last_name_score: f32,
    /// Single-token query equal to any name token
    pub exact_name_part_score: f32,

    /// "John Smith" against "John Michael Smith"
    pub name_without_middle_score: f32,
    /// Identical middle-token sequences
    pub name_with_middle_score: f32,
    /// Middle initials on one side matching middle names on the other
    pub middle_initial_match_score: f32,

    /// Minimum top score for a result set to collapse to a single match
    pub dominance_score: f32,
    /// Minimum lead over the runner-up for that collapse (strictly greater)
    pub dominance_margin: f32,
}

impl Default for MatchingProfile {
    fn default() -> Self {
        Self {
            enable_partial_names: true,
            enable_exact_pass: true,
            enable_middle_name_rule: true,
            enable_fuzzy: true,
            substring_fallback: false,

            fuzzy_min_ratio: 0.85,
            fuzzy_damping: 0.95,
            semantic_partial_damping: 0.7,

            first_initial_score: 0.85,
            last_initial_score: 0.85,
            middle_initial_score: 0.80,
            exact_first_name_score: 0.95,
            exact_last_name_score: 0.95,
            exact_name_part_score: 0.90,

            name_without_middle_score: 0.95,
            name_with_middle_score: 0.98,
            middle_initial_match_score: 0.96,

            dominance_score: 0.85,
            dominance_margin: 0.10,
        }
    }
}

impl MatchingProfile {
    /// Pure embedding ranking with substring fallback
    ///
    /// Every lexical pass is off; results come from the semantic pass alone.
    pub fn semantic_only() -> Self {
        Self {
            enable_partial_names: false,
            enable_exact_pass: false,
            enable_middle_name_rule: false,
            enable_fuzzy: false,
            substring_fallback: true,
            ..Self::default()
        }
    }

    /// Parse a profile from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)
            .map_err(|e| MatchError::InvalidProfile(format!("unparseable profile: {}", e)))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Lowest score any exact-pass rule can assign
    pub fn min_exact_score(&self) -> f32 {
        let mut min = 1.0_f32;
        if self.enable_middle_name_rule {
            min = min
                .min(self.name_without_middle_score)
                .min(self.name_with_middle_score)
                .min(self.middle_initial_match_score);
        }
        min
    }

    /// Check value ranges and the preference ordering between strategies
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("fuzzyMinRatio", self.fuzzy_min_ratio),
            ("fuzzyDamping", self.fuzzy_damping),
            ("semanticPartialDamping", self.semantic_partial_damping),
            ("firstInitialScore", self.first_initial_score),
            ("lastInitialScore", self.last_initial_score),
            ("middleInitialScore", self.middle_initial_score),
            ("exactFirstNameScore", self.exact_first_name_score),
            ("exactLastNameScore", self.exact_last_name_score),
            ("exactNamePartScore", self.exact_name_part_score),
            ("nameWithoutMiddleScore", self.name_without_middle_score),
            ("nameWithMiddleScore", self.name_with_middle_score),
            ("middleInitialMatchScore", self.middle_initial_match_score),
            ("dominanceScore", self.dominance_score),
        ];
        for (name, value) in unit {
            if !(value > 0.0 && value <= 1.0) {
                return Err(MatchError::InvalidProfile(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(0.0..1.0).contains(&self.dominance_margin) {
            return Err(MatchError::InvalidProfile(format!(
                "dominanceMargin must be in [0, 1), got {}",
                self.dominance_margin
            )));
        }

        // exact > fuzzy: a fuzzy ratio below 1.0 must land under every exact score
        if self.fuzzy_damping > self.min_exact_score() {
            return Err(MatchError::InvalidProfile(format!(
                "fuzzyDamping ({}) exceeds the lowest exact score ({})",
                self.fuzzy_damping,
                self.min_exact_score()
            )));
        }

        // exact token > initial > semantic partial
        let strongest_initial = self.first_initial_score.max(self.last_initial_score);
        let chain = [
            (
                "exactFirstNameScore",
                self.exact_first_name_score.min(self.exact_last_name_score),
                "exactNamePartScore",
                self.exact_name_part_score,
            ),
            (
                "exactNamePartScore",
                self.exact_name_part_score,
                "first/last initial scores",
                strongest_initial,
            ),
            (
                "first/last initial scores",
                self.first_initial_score.min(self.last_initial_score),
                "middleInitialScore",
                self.middle_initial_score,
            ),
            (
                "middleInitialScore",
                self.middle_initial_score,
                "semanticPartialDamping",
                self.semantic_partial_damping,
            ),
        ];
        for (higher_name, higher, lower_name, lower) in chain {
            if higher < lower {
                return Err(MatchError::InvalidProfile(format!(
                    "{} ({}) must not rank below {} ({})",
                    higher_name, higher, lower_name, lower
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
