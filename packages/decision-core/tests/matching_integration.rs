//! Integration tests for NGO matching.

use std::sync::Arc;
use std::time::Duration;

use decision_core::{
    testing::{MockOperation, MockOracle},
    DecisionConfig, DecisionEngine, DecisionError, EmbeddingCache, FallbackPolicy, MatchResult,
    MatchingService, Ngo, Oracle, OracleError, Provenance, UnavailableOracle,
};
use uuid::Uuid;

const PROGRAM: &str = "maternal nutrition program";

fn semantic_corpus() -> Vec<Ngo> {
    vec![
        Ngo::new("Chetna", "urban transport"),
        Ngo::new("Bala", "school sanitation"),
        Ngo::new("Asha", "maternal nutrition"),
    ]
}

fn semantic_oracle() -> MockOracle {
    MockOracle::new()
        .with_embedding(PROGRAM, vec![1.0, 0.0, 0.0])
        .with_embedding("maternal nutrition", vec![1.0, 0.0, 0.0])
        .with_embedding("school sanitation", vec![0.0, 1.0, 0.0])
        .with_embedding("urban transport", vec![-1.0, 0.0, 0.0])
}

fn service<O: Oracle>(oracle: O) -> MatchingService<O> {
    MatchingService::new(oracle, FallbackPolicy::new(Duration::from_secs(1)))
}

fn lexical_corpus() -> Vec<Ngo> {
    vec![
        Ngo::new("Code for Kids", "Coding bootcamps for school children").with_focus_areas(["education"]),
        Ngo::new("Mahila Shakti", "Women's health awareness in villages")
            .with_focus_areas(["community health"]),
        Ngo::new("Gramin Swasthya", "Trains rural community health worker cadres")
            .with_focus_areas(["antenatal care"]),
    ]
}

#[tokio::test]
async fn test_semantic_ranking() {
    let result = service(semantic_oracle())
        .match_ngos(PROGRAM, &semantic_corpus())
        .await
        .unwrap();

    assert_eq!(result.provenance, Provenance::Oracle);
    assert_eq!(result.names(), vec!["Asha", "Bala", "Chetna"]);
    let scores: Vec<u8> = result.matches.iter().map(|m| m.alignment_score).collect();
    assert_eq!(scores, vec![100, 50, 0]);
}

#[tokio::test]
async fn test_ngo_embeddings_are_cached() {
    let oracle = Arc::new(semantic_oracle().with_embedding("a different program", vec![0.0, 0.0, 1.0]));
    let service = service(oracle.clone());
    let corpus = semantic_corpus();

    service.match_ngos(PROGRAM, &corpus).await.unwrap();
    assert_eq!(oracle.call_count(MockOperation::Embed), 4);
    assert_eq!(service.cache().len(), 3);

    let second = service.match_ngos("a different program", &corpus).await.unwrap();
    assert_eq!(second.provenance, Provenance::Oracle);
    // Only the new program text is embedded
    assert_eq!(oracle.call_count(MockOperation::Embed), 5);
}

#[tokio::test]
async fn test_alignment_is_recomputed_per_program() {
    let oracle = semantic_oracle().with_embedding("sanitation drive", vec![0.0, 1.0, 0.0]);
    let service = service(oracle);
    let corpus = semantic_corpus();

    let first = service.match_ngos(PROGRAM, &corpus).await.unwrap();
    let second = service.match_ngos("sanitation drive", &corpus).await.unwrap();

    assert_eq!(first.names()[0], "Asha");
    assert_eq!(second.names()[0], "Bala");
}

#[tokio::test]
async fn test_lexical_fallback_scenario() {
    let result = service(UnavailableOracle)
        .match_ngos("rural antenatal community health worker program", &lexical_corpus())
        .await
        .unwrap();

    assert_eq!(result.provenance, Provenance::Fallback);
    assert_eq!(result.names(), vec!["Gramin Swasthya", "Mahila Shakti", "Code for Kids"]);
    let scores: Vec<u8> = result.matches.iter().map(|m| m.alignment_score).collect();
    assert_eq!(scores, vec![83, 33, 0]);
}

#[tokio::test]
async fn test_dimension_mismatch_falls_back() {
    let oracle = semantic_oracle().with_embedding("school sanitation", vec![0.0, 1.0]);
    let result = service(oracle).match_ngos(PROGRAM, &semantic_corpus()).await.unwrap();
    assert_eq!(result.provenance, Provenance::Fallback);
}

#[tokio::test]
async fn test_embedding_failure_falls_back() {
    let oracle = MockOracle::new().with_failure(MockOperation::Embed, OracleError::Api("503".into()));
    let result = service(oracle)
        .match_ngos("rural antenatal community health worker program", &lexical_corpus())
        .await
        .unwrap();
    assert_eq!(result.provenance, Provenance::Fallback);
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_ties_break_by_name() {
    let corpus = vec![
        Ngo::new("Zeta Trust", "maternal care"),
        Ngo::new("Alpha Trust", "maternal care"),
    ];
    let result = service(UnavailableOracle).match_ngos("maternal care", &corpus).await.unwrap();
    assert_eq!(result.names(), vec!["Alpha Trust", "Zeta Trust"]);
}

#[tokio::test]
async fn test_empty_corpus_is_empty_result() {
    let result = service(UnavailableOracle).match_ngos(PROGRAM, &[]).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_blank_program_rejected() {
    let err = service(UnavailableOracle)
        .match_ngos("  ", &semantic_corpus())
        .await
        .unwrap_err();
    assert!(matches!(err, DecisionError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_engine_applies_result_limit() {
    let config = DecisionConfig::default().with_match_result_limit(2);
    let engine = DecisionEngine::new(UnavailableOracle, config);
    let result = engine
        .match_ngos("rural antenatal community health worker program", &lexical_corpus())
        .await
        .unwrap();
    assert_eq!(result.names(), vec!["Gramin Swasthya", "Mahila Shakti"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shared_cache_under_concurrent_matches() {
    let cache = Arc::new(EmbeddingCache::new());
    let scaled = MockOracle::new()
        .with_embedding(PROGRAM, vec![2.0, 0.0, 0.0])
        .with_embedding("maternal nutrition", vec![2.0, 0.0, 0.0])
        .with_embedding("school sanitation", vec![0.0, 2.0, 0.0])
        .with_embedding("urban transport", vec![-2.0, 0.0, 0.0]);

    let first = service(semantic_oracle().with_delay(Duration::from_millis(20))).with_cache(cache.clone());
    let second = service(scaled.with_delay(Duration::from_millis(20))).with_cache(cache.clone());
    let corpus = semantic_corpus();

    let (a, b) = tokio::join!(first.match_ngos(PROGRAM, &corpus), second.match_ngos(PROGRAM, &corpus));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(cache.len(), corpus.len());
    assert_eq!(a.provenance, Provenance::Oracle);
    assert_eq!(b.provenance, Provenance::Oracle);
    assert_eq!(a.names(), b.names());
    let scores = |r: &MatchResult| r.matches.iter().map(|m| m.alignment_score).collect::<Vec<u8>>();
    assert_eq!(scores(&a), scores(&b));

    let unscaled = semantic_oracle();
    for ngo in &corpus {
        let key = EmbeddingCache::key(ngo);
        let stored = cache.get(&key).unwrap();
        let original = unscaled.embed(&ngo.description).await.unwrap();
        let doubled: Vec<f32> = original.iter().map(|x| x * 2.0).collect();
        assert!(*stored == original || *stored == doubled, "{}", ngo.name);
        // Later writers get the first stored vector back
        assert_eq!(cache.insert(key, vec![9.0, 9.0, 9.0]), stored);
    }
}

#[tokio::test]
async fn test_duplicate_detected_by_embedding() {
    let oracle = MockOracle::new().with_embedding("Lotus Hospital. Maternity care", vec![1.0, 0.02, 0.0]);
    let engine = DecisionEngine::new(oracle, DecisionConfig::default());
    let lotus = Uuid::new_v4();
    let existing = vec![(Uuid::new_v4(), vec![0.0, 1.0, 0.0]), (lotus, vec![1.0, 0.0, 0.0])];

    let found = engine
        .check_duplicate("Lotus Hospital. Maternity care", &existing)
        .await
        .unwrap();
    assert_eq!(found, Some(lotus));
}

#[tokio::test]
async fn test_duplicate_check_without_oracle_finds_nothing() {
    let engine = DecisionEngine::new(UnavailableOracle, DecisionConfig::default());
    let existing = vec![(Uuid::new_v4(), vec![1.0, 0.0, 0.0])];
    let found = engine.check_duplicate("Lotus Hospital", &existing).await.unwrap();
    assert_eq!(found, None);
}
