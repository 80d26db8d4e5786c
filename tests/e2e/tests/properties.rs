//! Property tests: invariants of the match policy over the sample corpus

use namematch_core::text::fuzzy_ratio;
use namematch_core::{
    Entity, HashingEmbedder, MatchEngine, MatchKind, MatchType, MatchingProfile,
};
use namematch_e2e_tests::mocks::TestDataFactory;

fn engine() -> MatchEngine<HashingEmbedder> {
    MatchEngine::new(HashingEmbedder::default())
}

#[test]
fn test_descriptor_query_is_exact_in_any_case() {
    let engine = engine();
    let entities = TestDataFactory::people();
    let index = engine.build_index(&entities).unwrap();

    for entity in &entities {
        for query in [
            entity.descriptor.clone(),
            entity.descriptor.to_uppercase(),
            entity.descriptor.to_lowercase(),
        ] {
            let outcome = engine.search(&query, &index, 0.5).unwrap();
            let hit = outcome
                .results
                .iter()
                .find(|r| r.entity_id == entity.id)
                .unwrap_or_else(|| panic!("{query} did not return {}", entity.id));

            assert_eq!(outcome.match_type, MatchType::Exact, "{query}");
            assert_eq!(hit.similarity, 1.0, "{query}");
            assert_eq!(hit.match_kind, MatchKind::ExactDescriptor, "{query}");
        }
    }
}

#[test]
fn test_full_name_queries_are_case_invariant() {
    let engine = engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    for query in ["John Smith", "Jhon Smith", "Sarah Jonson", "Michael Johnson", "Jane Doe"] {
        let original = engine.search(query, &index, 0.3).unwrap();
        let upper = engine.search(&query.to_uppercase(), &index, 0.3).unwrap();
        let lower = engine.search(&query.to_lowercase(), &index, 0.3).unwrap();

        assert_eq!(original.ids(), upper.ids(), "{query}");
        assert_eq!(original.ids(), lower.ids(), "{query}");
        assert_eq!(original.match_type, lower.match_type, "{query}");
    }
}

#[test]
fn test_first_name_query_scores_at_least_exact_token() {
    let engine = engine();
    let entities = TestDataFactory::people();
    let index = engine.build_index(&entities).unwrap();

    for entry in index.entries() {
        let first = &entry.name_parts.first;
        let outcome = engine.search(first, &index, 0.5).unwrap();

        let hit = outcome
            .results
            .iter()
            .find(|r| r.entity_id == entry.entity.id)
            .unwrap();
        assert!(hit.similarity >= 0.95, "{first}");

        let expected = if outcome.results.len() > 1 {
            MatchType::Partial
        } else {
            MatchType::Exact
        };
        assert_eq!(outcome.match_type, expected, "{first}");
    }

    assert_eq!(engine.search("Michael", &index, 0.5).unwrap().match_type, MatchType::Exact);
    assert_eq!(engine.search("John", &index, 0.5).unwrap().match_type, MatchType::Partial);
}

#[test]
fn test_fuzzy_boundary_is_inclusive() {
    let engine = engine();
    let index = engine
        .build_index(&[Entity::new("x", "abcdefghi klmnopqrst - Placeholder")])
        .unwrap();

    // 17 matching characters over 20 + 20
    let at_boundary = "abcdefghi klmnopqxyz";
    assert_eq!(fuzzy_ratio(at_boundary, "abcdefghi klmnopqrst"), 0.85);
    let outcome = engine.search(at_boundary, &index, 0.5).unwrap();
    assert_eq!(outcome.results[0].match_kind, MatchKind::Fuzzy);
    assert!((outcome.results[0].similarity - 0.85 * 0.95).abs() < 1e-6);

    // 17 over 20 + 21
    let below = "abcdefghi klmnopqxyzw";
    assert!(fuzzy_ratio(below, "abcdefghi klmnopqrst") < 0.85);
    let outcome = engine.search(below, &index, 0.0).unwrap();
    assert!(outcome.results.iter().all(|r| r.match_kind != MatchKind::Fuzzy));
}

#[test]
fn test_exact_always_outranks_fuzzy() {
    let profile = MatchingProfile::default();
    let best_fuzzy = profile.fuzzy_damping * 1.0;
    for exact in [
        1.0,
        profile.name_without_middle_score,
        profile.name_with_middle_score,
        profile.middle_initial_match_score,
    ] {
        assert!(exact >= best_fuzzy);
    }

    // "Jon Smith" would pass the fuzzy pass, but the exact hit short-circuits it
    let engine = engine();
    let index = engine
        .build_index(&[
            Entity::new("exact", "John Smith - Engineer"),
            Entity::new("typo", "Jon Smith - Engineer"),
        ])
        .unwrap();
    assert!(fuzzy_ratio("John Smith", "Jon Smith") >= 0.85);

    let outcome = engine.search("John Smith", &index, 0.5).unwrap();
    assert_eq!(outcome.ids(), vec!["exact"]);
    assert_eq!(outcome.results[0].similarity, 1.0);
}

#[test]
fn test_preference_ordering_of_partial_scores() {
    let p = MatchingProfile::default();
    assert!(p.exact_first_name_score >= p.exact_name_part_score);
    assert!(p.exact_name_part_score >= p.first_initial_score);
    assert!(p.first_initial_score >= p.middle_initial_score);
    assert!(p.middle_initial_score >= p.semantic_partial_damping);
}

#[test]
fn test_search_is_idempotent() {
    let engine = engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    for query in ["J", "Johnson", "John Smith", "Jhon Smith", "physics professor at MIT", ""] {
        let first = engine.search(query, &index, 0.2).unwrap();
        let second = engine.search(query, &index, 0.2).unwrap();
        assert_eq!(first.results, second.results, "{query}");
        assert_eq!(first.match_type, second.match_type, "{query}");
        assert_eq!(first.query_type, second.query_type, "{query}");
    }
}

#[test]
fn test_concurrent_searches_agree() {
    let engine = engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();
    let queries = ["J", "Johnson", "John Smith", "Jhon Smith", "composer"];
    let expected: Vec<Vec<String>> = queries
        .iter()
        .map(|q| {
            engine
                .search(q, &index, 0.3)
                .unwrap()
                .ids()
                .into_iter()
                .map(str::to_string)
                .collect()
        })
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (query, want) in queries.iter().zip(&expected) {
                    let got = engine.search(query, &index, 0.3).unwrap();
                    assert_eq!(&got.ids(), want);
                }
            });
        }
    });
}

#[test]
fn test_results_sorted_and_bounded() {
    let engine = engine();
    let index = engine.build_index(&TestDataFactory::people()).unwrap();

    for query in ["S", "Smith", "jane smyth", "software engineer at google", "tech"] {
        let outcome = engine.search(query, &index, 0.0).unwrap();
        for pair in outcome.results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity, "{query}");
        }
        assert!(outcome
            .results
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.similarity)));
    }
}
