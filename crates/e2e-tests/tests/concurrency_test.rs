//! Concurrent query E2E tests.
//!
//! A loaded engine is shared across threads and tasks; queries must not
//! interfere with one another.

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;

use advisor_types::MatcherSettings;
use e2e_tests::{synthetic_records, TestHarness};

const GOALS: &[&str] = &[
    "data analysis",
    "network security",
    "history of painting",
    "robotics and signal processing",
    "marketing management",
];

#[test]
fn test_parallel_threads_match_sequential() {
    let harness = TestHarness::with_records(&synthetic_records(300, 5));
    let engine = Arc::new(harness.loaded_engine());

    let expected: Vec<_> = GOALS
        .iter()
        .map(|g| engine.recommend(g, 20).unwrap())
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        let idx = (t + i) % GOALS.len();
                        (idx, engine.recommend(GOALS[idx], 20).unwrap())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for (idx, results) in handle.join().unwrap() {
            assert_eq!(results, expected[idx]);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_load_and_query() {
    let harness = TestHarness::with_records(&synthetic_records(100, 9));
    let engine = Arc::new(harness.engine_with(
        Arc::new(advisor_embeddings::HashEmbedder::default()),
        MatcherSettings {
            default_top_k: 10,
            ..MatcherSettings::default()
        },
    ));

    // Several loaders racing: exactly one build wins, the rest are no-ops.
    let loaders: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            tokio::task::spawn_blocking(move || engine.load_resources())
        })
        .collect();
    for loader in loaders {
        loader.await.unwrap().unwrap();
    }

    let queries: Vec<_> = GOALS
        .iter()
        .map(|goal| {
            let engine = engine.clone();
            let goal = goal.to_string();
            tokio::task::spawn_blocking(move || engine.recommend_default(&goal))
        })
        .collect();
    for query in queries {
        assert_eq!(query.await.unwrap().unwrap().len(), 10);
    }
}
