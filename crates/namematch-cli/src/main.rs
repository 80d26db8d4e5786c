//! Namematch CLI
//!
//! Command-line front end for the entity matching engine: load an entity
//! corpus, run queries against it, inspect how queries and names are parsed.

mod input;
mod render;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use namematch_core::{
    classify_query, extract_name_parts, Embedder, HashingEmbedder, MatchEngine, RerankCache,
    RerankScorer, TermOverlapScorer, TwoStageMatcher, DEFAULT_THRESHOLD,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Namematch - entity matching from the command line
#[derive(Parser)]
#[command(name = "namematch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Match free-text queries against a corpus of entity descriptors")]
#[command(long_about = "Match free-text queries against a corpus of entity descriptors.\n\nCombines exact, fuzzy, partial-name and semantic matching, with optional two-stage reranking.")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedderKind {
    /// Feature-hashing embedder (offline, deterministic)
    Hashing,
    /// Local ONNX model via fastembed (requires the `embeddings` feature)
    Fastembed,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank entities against one or more queries
    Search {
        /// Queries to run
        queries: Vec<String>,

        /// JSON array of {"id", "descriptor"} records
        #[arg(long)]
        entities: PathBuf,

        /// File with one query per line ('#' starts a comment)
        #[arg(long)]
        queries_file: Option<PathBuf>,

        /// JSON matching profile (omitted fields take their defaults)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Pure embedding ranking with substring fallback
        #[arg(long)]
        semantic_only: bool,

        /// Minimum score to keep a result
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Rerank tightly clustered candidates in a second stage
        #[arg(long)]
        rerank: bool,

        /// JSON two-stage configuration
        #[arg(long)]
        rerank_config: Option<PathBuf>,

        /// Rerank cache capacity in result sets (0 disables the cache)
        #[arg(long, default_value = "10000")]
        cache_capacity: usize,

        /// Embedder used for the index and the queries
        #[arg(long, value_enum, default_value = "hashing")]
        embedder: EmbedderKind,

        /// Print one JSON object per query instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how a query is routed
    Classify {
        /// Query to classify
        query: String,
    },

    /// Show the name components extracted from descriptors
    Parts {
        /// Descriptors to decompose
        descriptors: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

struct SearchArgs {
    queries: Vec<String>,
    entities: PathBuf,
    queries_file: Option<PathBuf>,
    profile: Option<PathBuf>,
    semantic_only: bool,
    threshold: f32,
    rerank: bool,
    rerank_config: Option<PathBuf>,
    cache_capacity: usize,
    embedder: EmbedderKind,
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Search {
            queries,
            entities,
            queries_file,
            profile,
            semantic_only,
            threshold,
            rerank,
            rerank_config,
            cache_capacity,
            embedder,
            json,
        } => run_search(SearchArgs {
            queries,
            entities,
            queries_file,
            profile,
            semantic_only,
            threshold,
            rerank,
            rerank_config,
            cache_capacity,
            embedder,
            json,
        }),
        Commands::Classify { query } => run_classify(&query),
        Commands::Parts { descriptors, json } => run_parts(&descriptors, json),
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Logs go to stderr; stdout carries results only
fn init_logging(json: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn make_embedder(kind: EmbedderKind) -> anyhow::Result<Box<dyn Embedder>> {
    match kind {
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::default())),
        #[cfg(feature = "embeddings")]
        EmbedderKind::Fastembed => {
            let embedder = namematch_core::FastEmbedder::new();
            embedder.init()?;
            Ok(Box::new(embedder))
        }
        #[cfg(not(feature = "embeddings"))]
        EmbedderKind::Fastembed => {
            anyhow::bail!("fastembed support not compiled in; rebuild with --features embeddings")
        }
    }
}

/// Cross-encoder when available and loadable, term overlap otherwise
#[cfg(feature = "embeddings")]
fn make_scorer(kind: EmbedderKind) -> Box<dyn RerankScorer> {
    if matches!(kind, EmbedderKind::Fastembed) {
        let scorer = namematch_core::CrossEncoderScorer::new();
        match scorer.init() {
            Ok(()) => return Box::new(scorer),
            Err(e) => tracing::warn!("Falling back to term-overlap reranking: {}", e),
        }
    }
    Box::new(TermOverlapScorer)
}

#[cfg(not(feature = "embeddings"))]
fn make_scorer(_kind: EmbedderKind) -> Box<dyn RerankScorer> {
    Box::new(TermOverlapScorer)
}

fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let queries = input::collect_queries(&args.queries, args.queries_file.as_deref())?;
    let entities = input::load_entities(&args.entities)?;
    let profile = input::load_profile(args.profile.as_deref(), args.semantic_only)?;

    let engine = MatchEngine::with_profile(make_embedder(args.embedder)?, profile)?;
    let index = engine.build_index(&entities)?;
    info!(
        entities = index.len(),
        queries = queries.len(),
        "Running queries"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if !args.rerank {
        for query in &queries {
            let outcome = engine.search(query, &index, args.threshold)?;
            if args.json {
                render::write_json(&mut out, query, &outcome)?;
            } else {
                render::write_outcome(&mut out, query, &outcome)?;
                writeln!(out)?;
            }
        }
        out.flush()?;
        return Ok(());
    }

    let config = input::load_rerank_config(args.rerank_config.as_deref())?;
    let matcher = TwoStageMatcher::with_config(engine, make_scorer(args.embedder), config)?;
    let cache = (args.cache_capacity > 0).then(|| RerankCache::with_capacity(args.cache_capacity));

    for query in &queries {
        let outcome = matcher.search(query, &index, args.threshold, cache.as_ref())?;
        if args.json {
            render::write_json(&mut out, query, &outcome)?;
        } else {
            render::write_two_stage(&mut out, query, &outcome)?;
            writeln!(out)?;
        }
    }

    if !args.json {
        render::write_stats(&mut out, &matcher.stats())?;
    }
    out.flush()?;
    Ok(())
}

fn run_classify(query: &str) -> anyhow::Result<()> {
    let query_type = classify_query(query);
    println!("{} {}", format!("\"{}\"", query).white().bold(), query_type.as_str().cyan());
    Ok(())
}

fn run_parts(descriptors: &[String], json: bool) -> anyhow::Result<()> {
    if descriptors.is_empty() {
        anyhow::bail!("No descriptors given");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for descriptor in descriptors {
        let parts = extract_name_parts(descriptor);
        if json {
            serde_json::to_writer(&mut out, &parts)?;
            writeln!(out)?;
        } else {
            render::write_parts(&mut out, descriptor, &parts)?;
        }
    }
    out.flush()?;
    Ok(())
}
