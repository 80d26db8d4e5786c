//! Terminal and JSON output

use std::io::Write;

use colored::Colorize;
use namematch_core::{
    MatchResult, MatchType, NameParts, QueryType, RerankStats, SearchOutcome, TwoStageOutcome,
};
use serde::Serialize;

/// Longest descriptor shown in a table row
const DESCRIPTOR_WIDTH: usize = 60;

#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    query: &'a str,
    #[serde(flatten)]
    outcome: &'a T,
}

/// One JSON line per query
pub fn write_json<T: Serialize>(out: &mut impl Write, query: &str, outcome: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &Report { query, outcome })?;
    writeln!(out)?;
    Ok(())
}

fn match_type_label(match_type: MatchType) -> colored::ColoredString {
    match match_type {
        MatchType::Exact => match_type.as_str().green().bold(),
        MatchType::Partial => match_type.as_str().yellow().bold(),
        MatchType::Ambiguous => match_type.as_str().magenta().bold(),
    }
}

fn header(out: &mut impl Write, query: &str, query_type: QueryType, match_type: MatchType) -> anyhow::Result<()> {
    writeln!(
        out,
        "{} {} ({} -> {})",
        "===".cyan().bold(),
        format!("\"{}\"", query).white().bold(),
        query_type.as_str().dimmed(),
        match_type_label(match_type)
    )?;
    Ok(())
}

fn clip(text: &str) -> String {
    if text.chars().count() <= DESCRIPTOR_WIDTH {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(DESCRIPTOR_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

fn row(out: &mut impl Write, rank: usize, result: &MatchResult, extra: &str) -> anyhow::Result<()> {
    writeln!(
        out,
        "  {:>2}. {:<8} {:.3}  {:<28} {}{}",
        rank,
        result.entity_id.bold(),
        result.similarity,
        result.match_kind.as_str().cyan(),
        clip(&result.descriptor),
        extra.dimmed()
    )?;
    Ok(())
}

/// Ranked table for a single-stage search
pub fn write_outcome(out: &mut impl Write, query: &str, outcome: &SearchOutcome) -> anyhow::Result<()> {
    header(out, query, outcome.query_type, outcome.match_type)?;

    if outcome.results.is_empty() {
        writeln!(out, "  {}", "No matches.".dimmed())?;
    }
    for (i, result) in outcome.results.iter().enumerate() {
        row(out, i + 1, result, "")?;
    }
    writeln!(
        out,
        "  {}",
        format!("{:.2} ms", outcome.elapsed.as_secs_f64() * 1000.0).dimmed()
    )?;
    Ok(())
}

/// Ranked table for a two-stage search, with per-stage scores when reranked
pub fn write_two_stage(out: &mut impl Write, query: &str, outcome: &TwoStageOutcome) -> anyhow::Result<()> {
    header(out, query, outcome.query_type, outcome.match_type)?;

    if outcome.results.is_empty() {
        writeln!(out, "  {}", "No matches.".dimmed())?;
    }
    for (i, reranked) in outcome.results.iter().enumerate() {
        let extra = match reranked.rerank_score {
            Some(rerank) => format!("  (retrieval {:.3}, rerank {:.3})", reranked.retrieval_score, rerank),
            None => String::new(),
        };
        row(out, i + 1, &reranked.result, &extra)?;
    }

    let stage = if !outcome.used_reranker {
        "rerank skipped"
    } else if outcome.from_cache {
        "reranked (cached)"
    } else {
        "reranked"
    };
    writeln!(
        out,
        "  {}",
        format!(
            "{} of {} candidates, {:.2} ms",
            stage,
            outcome.retrieval_candidates,
            outcome.elapsed.as_secs_f64() * 1000.0
        )
        .dimmed()
    )?;
    Ok(())
}

/// Summary after a batch of two-stage searches
pub fn write_stats(out: &mut impl Write, stats: &RerankStats) -> anyhow::Result<()> {
    writeln!(out, "{}", "=== Rerank Statistics ===".yellow().bold())?;
    writeln!(out, "{}: {}", "Searches".white().bold(), stats.searches)?;
    writeln!(
        out,
        "{}: {} ({:.1}%)",
        "Reranked".white().bold(),
        stats.reranked,
        stats.reranked_share() * 100.0
    )?;
    writeln!(
        out,
        "{}: {:.1}% ({} hits, {} misses)",
        "Cache Hit Rate".white().bold(),
        stats.cache_hit_rate() * 100.0,
        stats.cache_hits,
        stats.cache_misses
    )?;
    Ok(())
}

/// Name components of one descriptor
pub fn write_parts(out: &mut impl Write, descriptor: &str, parts: &NameParts) -> anyhow::Result<()> {
    writeln!(out, "{} {}", "===".cyan().bold(), descriptor.white().bold())?;
    writeln!(out, "{}: {}", "Name".white().bold(), parts.full)?;
    writeln!(out, "{}: {}", "First".white().bold(), parts.first)?;
    writeln!(out, "{}: {}", "Middle".white().bold(), parts.middle.join(" "))?;
    writeln!(out, "{}: {}", "Last".white().bold(), parts.last)?;
    writeln!(out, "{}: {}", "Initials".white().bold(), parts.initials.join(" "))?;
    Ok(())
}
