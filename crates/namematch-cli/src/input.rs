//! Loading entities, profiles and queries from disk

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use namematch_core::{Entity, MatchingProfile, RerankConfig};

/// Read a JSON array of `{"id": ..., "descriptor": ...}` records
pub fn load_entities(path: &Path) -> anyhow::Result<Vec<Entity>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entities file {}", path.display()))?;
    let entities: Vec<Entity> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of entities", path.display()))?;
    Ok(entities)
}

/// Profile from a JSON file, the semantic-only preset, or the default
pub fn load_profile(path: Option<&Path>, semantic_only: bool) -> anyhow::Result<MatchingProfile> {
    match (path, semantic_only) {
        (Some(_), true) => bail!("--profile and --semantic-only are mutually exclusive"),
        (Some(path), false) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            MatchingProfile::from_json(&raw)
                .with_context(|| format!("Invalid profile {}", path.display()))
        }
        (None, true) => Ok(MatchingProfile::semantic_only()),
        (None, false) => Ok(MatchingProfile::default()),
    }
}

/// Rerank configuration from a JSON file, or the default
pub fn load_rerank_config(path: Option<&Path>) -> anyhow::Result<RerankConfig> {
    let Some(path) = path else {
        return Ok(RerankConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rerank config {}", path.display()))?;
    let config: RerankConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid rerank config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Positional queries followed by the lines of `file`
///
/// Blank lines and lines starting with `#` are skipped.
pub fn collect_queries(positional: &[String], file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut queries = positional.to_vec();

    if let Some(path) = file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read queries file {}", path.display()))?;
        queries.extend(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    if queries.is_empty() {
        bail!("No queries given; pass them as arguments or with --queries-file");
    }
    Ok(queries)
}
