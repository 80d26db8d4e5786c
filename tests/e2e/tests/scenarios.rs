//! Scenario tests: end-to-end searches over small, fully known corpora

use namematch_core::{
    Entity, EntityIndex, HashingEmbedder, MatchEngine, MatchError, MatchKind, MatchType,
    MatchingProfile, QueryType,
};
use namematch_e2e_tests::mocks::{LookupEmbedder, TestDataFactory};

fn hashing_engine() -> MatchEngine<HashingEmbedder> {
    MatchEngine::new(HashingEmbedder::default())
}

// ============================================================================
// NAMESAKES
// ============================================================================

#[test]
fn test_full_name_returns_both_namesakes() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::john_smiths()).unwrap();

    let outcome = engine.search("John Smith", &index, 0.5).unwrap();

    assert_eq!(outcome.match_type, MatchType::Exact);
    assert_eq!(outcome.ids(), vec!["1", "2"]);
    for result in &outcome.results {
        assert_eq!(result.similarity, 1.0);
        assert_eq!(result.match_kind, MatchKind::ExactFullName);
    }
}

#[test]
fn test_typo_reaches_both_namesakes_through_fuzzy_pass() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::john_smiths()).unwrap();

    let outcome = engine.search("Jhon Smith", &index, 0.5).unwrap();

    assert_eq!(outcome.ids(), vec!["1", "2"]);
    // Tied fuzzy scores never collapse
    assert_eq!(outcome.match_type, MatchType::Ambiguous);
    let ratio = namematch_core::fuzzy_ratio("Jhon Smith", "John Smith");
    assert!(ratio >= 0.85);
    for result in &outcome.results {
        assert_eq!(result.match_kind, MatchKind::Fuzzy);
        assert!((result.similarity - ratio * 0.95).abs() < 1e-6);
    }
}

#[test]
fn test_typo_in_full_corpus_ranks_namesakes_first() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    let outcome = engine.search("Jhon Smith", &index, 0.5).unwrap();

    assert_eq!(&outcome.ids()[..2], &["1", "2"]);
    assert_eq!(outcome.query_type, QueryType::FullName);
}

// ============================================================================
// SEMANTIC
// ============================================================================

#[test]
fn test_role_query_finds_single_athlete() {
    let embedder = LookupEmbedder::new()
        .with_axis(&["Olympic Athlete", "Michael Johnson - Olympic Athlete"], 0);
    let engine = MatchEngine::new(embedder);
    let index = engine
        .build_index(&[Entity::new("5", "Michael Johnson - Olympic Athlete")])
        .unwrap();

    let outcome = engine.search("Olympic Athlete", &index, 0.4).unwrap();

    assert_eq!(outcome.ids(), vec!["5"]);
    assert_eq!(outcome.match_type, MatchType::Exact);
    assert_eq!(outcome.results[0].match_kind, MatchKind::Semantic);
    assert!((outcome.results[0].similarity - 1.0).abs() < 1e-6);
}

#[test]
fn test_role_query_collapses_in_full_corpus() {
    let embedder = LookupEmbedder::new()
        .with_axis(&["Olympic Athlete", "Michael Johnson - Olympic Athlete"], 0);
    let engine = MatchEngine::new(embedder);
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    let outcome = engine.search("Olympic Athlete", &index, 0.4).unwrap();

    assert_eq!(outcome.ids(), vec!["5"]);
    assert_eq!(outcome.match_type, MatchType::Exact);
}

#[test]
fn test_close_semantic_scores_stay_ambiguous() {
    // cos 0.9 and 0.86: both above the dominance score, margin too small
    let embedder = LookupEmbedder::new()
        .with_vector("Gold Medalist", &[1.0, 0.0])
        .with_vector("Michael Johnson - Olympic Athlete", &[0.9, 0.435_889_9])
        .with_vector("Sarah Johnson - CEO of Tech Startup", &[0.86, 0.510_294])
        .with_vector("Sarah Johnson - ceo of tech startup", &[0.86, 0.510_294]);
    let engine = MatchEngine::new(embedder);
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    let outcome = engine.search("Gold Medalist", &index, 0.5).unwrap();

    assert_eq!(outcome.match_type, MatchType::Ambiguous);
    assert_eq!(outcome.ids(), vec!["5", "7"]);
}

// ============================================================================
// PARTIAL NAMES
// ============================================================================

#[test]
fn test_single_initial_matches_first_initials_only() {
    let engine = hashing_engine();
    let index = engine
        .build_index(&[
            Entity::new("john", "John Smith - Engineer"),
            Entity::new("jane", "Jane Doe - Manager"),
            Entity::new("michael", "Michael Davis - Athlete"),
        ])
        .unwrap();

    let outcome = engine.search("J", &index, 0.5).unwrap();

    assert_eq!(outcome.ids(), vec!["john", "jane"]);
    assert_eq!(outcome.match_type, MatchType::Partial);
    for result in &outcome.results {
        assert_eq!(result.similarity, 0.85);
        assert_eq!(result.match_kind, MatchKind::FirstInitial);
    }
}

#[test]
fn test_shared_last_name_is_partial() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    let outcome = engine.search("Johnson", &index, 0.5).unwrap();

    assert_eq!(outcome.match_type, MatchType::Partial);
    assert_eq!(outcome.ids(), vec!["5", "7"]);
    assert!(outcome.results.iter().all(|r| r.match_kind == MatchKind::ExactLastName));
}

#[test]
fn test_first_name_does_not_pull_in_similar_last_names() {
    // "John" must not reach "Johnson" through the damped name similarity
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    let outcome = engine.search("John", &index, 0.5).unwrap();

    assert_eq!(outcome.ids(), vec!["1", "2", "3", "6"]);
    assert!(outcome.results.iter().all(|r| r.similarity == 0.95));
}

// ============================================================================
// MIDDLE NAMES
// ============================================================================

#[test]
fn test_middle_name_variants() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::middle_names()).unwrap();

    let cases = [
        ("John Smith", MatchKind::NameWithoutMiddle, 0.95),
        ("John Michael Smith", MatchKind::ExactFullName, 1.0),
        ("John M. Smith", MatchKind::NameWithMiddleInitial, 0.96),
        ("Jane Quentin Public", MatchKind::NameMatchesMiddleInitial, 0.96),
        ("Jane Q. Public", MatchKind::ExactFullName, 1.0),
    ];

    for (query, kind, score) in cases {
        let outcome = engine.search(query, &index, 0.5).unwrap();
        let top = outcome.top().unwrap();
        assert_eq!(outcome.match_type, MatchType::Exact, "{query}");
        assert_eq!(top.match_kind, kind, "{query}");
        assert_eq!(top.similarity, score, "{query}");
    }
}

#[test]
fn test_wrong_middle_initial_is_not_exact() {
    let engine = hashing_engine();
    let index = engine.build_index(&TestDataFactory::middle_names()).unwrap();

    let outcome = engine.search("John K. Smith", &index, 0.5).unwrap();

    assert!(outcome.results.iter().all(|r| !r.match_kind.is_exact_pass()));
}

// ============================================================================
// EDGE CASES
// ============================================================================

#[test]
fn test_single_opaque_token_descriptor() {
    let engine = hashing_engine();
    let index = engine
        .build_index(&[Entity::new("cher", "Cher"), Entity::new("js", "John Smith - Engineer")])
        .unwrap();

    let parts = &index.get(0).unwrap().name_parts;
    assert_eq!(parts.initials, vec!["C"]);
    assert_eq!(parts.last, "");

    let by_initial = engine.search("c", &index, 0.5).unwrap();
    assert_eq!(by_initial.ids(), vec!["cher"]);
    assert_eq!(by_initial.results[0].match_kind, MatchKind::FirstInitial);

    let by_name = engine.search("CHER", &index, 0.5).unwrap();
    assert_eq!(by_name.ids(), vec!["cher"]);
    assert_eq!(by_name.match_type, MatchType::Exact);
}

#[test]
fn test_empty_index_for_every_query_type() {
    let engine = hashing_engine();
    let index = EntityIndex::build(&[], engine.embedder()).unwrap();

    for query in ["J", "John", "John Smith", "who won gold in 1996", ""] {
        let outcome = engine.search(query, &index, 0.5).unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.match_type, MatchType::Ambiguous);
    }
}

#[test]
fn test_invalid_corpus_is_rejected() {
    let engine = hashing_engine();

    let duplicate = [Entity::new("1", "A B"), Entity::new("1", "C D")];
    assert!(matches!(
        engine.build_index(&duplicate),
        Err(MatchError::InvalidEntity { position: 1, .. })
    ));

    let blank = [Entity::new("1", "  ")];
    assert!(matches!(
        engine.build_index(&blank),
        Err(MatchError::InvalidEntity { position: 0, .. })
    ));
}

#[test]
fn test_semantic_only_baseline_with_substring_fallback() {
    let engine =
        MatchEngine::with_profile(HashingEmbedder::default(), MatchingProfile::semantic_only())
            .unwrap();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    // Nothing clears 0.99 semantically; "startup" is a substring of one descriptor
    let outcome = engine.search("startup", &index, 0.99).unwrap();
    assert_eq!(outcome.ids(), vec!["7"]);
    assert_eq!(outcome.results[0].match_kind, MatchKind::Substring);

    // The multi-strategy profile has no fallback
    let default_engine = hashing_engine();
    let index = default_engine.build_index(&TestDataFactory::people()).unwrap();
    let outcome = default_engine.search("startup", &index, 0.99).unwrap();
    assert!(outcome.results.is_empty());
}

#[test]
fn test_entities_round_trip_through_json_file() {
    let file = TestDataFactory::entities_file(&TestDataFactory::people());
    let raw = std::fs::read_to_string(file.path()).unwrap();
    let entities: Vec<Entity> = serde_json::from_str(&raw).unwrap();

    let engine = hashing_engine();
    let index = engine.build_index(&entities).unwrap();
    assert_eq!(index.len(), 7);
    assert_eq!(engine.search("Sarah", &index, 0.5).unwrap().ids(), vec!["7"]);
}
