//! Error path E2E tests.
//!
//! Missing or malformed course data, calls before loading and invalid
//! arguments must all surface as typed errors. No test should panic inside
//! the engine.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use advisor_embeddings::HashEmbedder;
use advisor_engine::{EngineError, EngineState};
use advisor_types::MatcherSettings;
use e2e_tests::TestHarness;

#[test]
fn test_recommend_before_load_is_not_ready() {
    let harness = TestHarness::new();
    let engine = harness.engine();

    assert!(!engine.is_ready());
    let err = engine.recommend("anything", 5).unwrap_err();
    assert!(matches!(err, EngineError::NotReady));
    assert_eq!(err.kind(), "not_ready");
}

#[test]
fn test_missing_data_file() {
    let harness = TestHarness::empty();
    let engine = harness.engine();

    let err = engine.load_resources().unwrap_err();
    assert!(matches!(err, EngineError::DataNotFound(ref p) if *p == harness.corpus_path));
    assert_eq!(engine.status().state, EngineState::Failed);
    assert!(matches!(engine.recommend("x", 1), Err(EngineError::NotReady)));
}

#[test]
fn test_malformed_json() {
    let harness = TestHarness::empty();
    harness.write_corpus("[{\"code\": \"CS101\", \"name\": ");
    let engine = harness.engine();

    let err = engine.load_resources().unwrap_err();
    assert!(matches!(err, EngineError::DataCorrupt { .. }));
    assert!(!engine.is_ready());
}

#[test]
fn test_not_an_array() {
    let harness = TestHarness::empty();
    harness.write_corpus(r#"{"courses": []}"#);

    let err = harness.engine().load_resources().unwrap_err();
    assert!(matches!(err, EngineError::DataCorrupt { .. }));
}

#[test]
fn test_record_without_name() {
    let harness = TestHarness::with_records(&[
        json!({"code": "CS101", "name": "Intro to AI"}),
        json!({"code": "CS102", "description": "No name here"}),
    ]);

    let err = harness.engine().load_resources().unwrap_err();
    match err {
        EngineError::DataCorrupt { reason, .. } => assert!(reason.contains("name"), "{reason}"),
        other => panic!("expected DataCorrupt, got {other:?}"),
    }
}

#[test]
fn test_failed_load_can_be_retried() {
    let harness = TestHarness::empty();
    let engine = harness.engine();
    assert!(engine.load_resources().is_err());

    harness.write_corpus(r#"[{"code": "CS101", "name": "Intro to AI"}]"#);
    engine.load_resources().unwrap();

    let status = engine.status();
    assert_eq!(status.state, EngineState::Ready);
    assert_eq!(status.courses, 1);
    assert!(status.error.is_none());
}

#[test]
fn test_reload_while_ready_keeps_snapshot() {
    let harness = TestHarness::new();
    let engine = harness.loaded_engine();
    let before = engine.snapshot().unwrap();

    // Changing the file after load does not affect a ready engine.
    harness.write_corpus("[]");
    engine.load_resources().unwrap();

    let after = engine.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.corpus().len(), 6);
}

#[test]
fn test_invalid_arguments() {
    let engine = TestHarness::new().loaded_engine();

    assert!(matches!(
        engine.recommend("", 5),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.recommend(" \t\n", 5),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.recommend("databases", 0),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(engine.is_ready());
}

#[test]
fn test_zero_dimension_embedder_fails_load() {
    let harness = TestHarness::new();
    let engine = harness.engine_with(Arc::new(HashEmbedder::new(0)), MatcherSettings::default());

    let err = engine.load_resources().unwrap_err();
    assert!(matches!(err, EngineError::EncodingFailure(_)));
    assert_eq!(engine.status().state, EngineState::Failed);
}
