//! End-to-end test infrastructure for the course advisor.
//!
//! Provides a shared TestHarness that writes course data to a temp
//! directory and builds engines over it, plus sample course fixtures.

use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use advisor_embeddings::{EmbeddingModel, HashEmbedder};
use advisor_engine::AdvisorEngine;
use advisor_types::MatcherSettings;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Path of the course data file
    pub corpus_path: PathBuf,
}

impl TestHarness {
    /// Harness with the sample catalogue written to disk.
    pub fn new() -> Self {
        Self::with_records(&sample_records())
    }

    /// Harness with the given JSON records written to disk.
    pub fn with_records(records: &[Value]) -> Self {
        let harness = Self::empty();
        harness.write_corpus(&Value::Array(records.to_vec()).to_string());
        harness
    }

    /// Harness with no data file yet.
    pub fn empty() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let corpus_path = temp_dir.path().join("final_mapped_data.json");
        Self {
            _temp_dir: temp_dir,
            corpus_path,
        }
    }

    /// Overwrite the data file with raw text.
    pub fn write_corpus(&self, contents: &str) {
        std::fs::write(&self.corpus_path, contents).expect("Failed to write corpus");
    }

    /// Unloaded engine over this harness's data using the hash embedder.
    pub fn engine(&self) -> AdvisorEngine {
        self.engine_with(Arc::new(HashEmbedder::default()), MatcherSettings::default())
    }

    pub fn engine_with(
        &self,
        embedder: Arc<dyn EmbeddingModel>,
        matcher: MatcherSettings,
    ) -> AdvisorEngine {
        AdvisorEngine::new(
            &self.corpus_path,
            advisor_engine::EmbedderSource::Shared(embedder),
            matcher,
        )
    }

    /// Loaded engine over this harness's data.
    pub fn loaded_engine(&self) -> AdvisorEngine {
        let engine = self.engine();
        engine.load_resources().expect("Failed to load engine");
        engine
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A small catalogue spanning distinct fields, in the on-disk record shape.
pub fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "code": "CS101",
            "name": "Intro to AI",
            "description": "Covers machine learning basics",
            "credits": 3,
            "mapped_skills": [
                {"skill": "Python", "type": "hard"},
                {"skill": "python", "type": "hard"}
            ]
        }),
        json!({
            "id": 2,
            "code": "ART200",
            "name": "Oil Painting",
            "description": "Studio technique",
            "mapped_skills": []
        }),
        json!({
            "id": 3,
            "code": "CS305",
            "name": "Database Systems",
            "description": "Relational databases, SQL queries and transaction processing",
            "mapped_skills": [{"skill": "SQL"}, {"skill": "Data Modeling"}]
        }),
        json!({
            "id": 4,
            "code": "EEMBA",
            "name": "Executive MBA Seminar",
            "description": "Leadership and strategy"
        }),
        json!({
            "id": 5,
            "code": "FIN210",
            "name": "Corporate Finance",
            "description": "Valuation, capital budgeting and financial statements",
            "mapped_skills": [{"skill": "Financial Analysis"}, {"skill": "Excel"}]
        }),
        json!({
            "id": 6,
            "code": "ME401",
            "name": "Robotics",
            "description": null,
            "mapped_skills": null
        }),
    ]
}

/// `count` synthetic records with random vocabulary, reproducible by `seed`.
pub fn synthetic_records(count: usize, seed: u64) -> Vec<Value> {
    const WORDS: &[&str] = &[
        "data", "systems", "design", "analysis", "management", "network", "signal", "finance",
        "marketing", "chemistry", "biology", "physics", "statistics", "learning", "history",
        "painting", "language", "security", "robotics", "economics",
    ];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pick = |n: usize| -> Vec<&'static str> {
        (0..n)
            .map(|_| WORDS[rng.random_range(0..WORDS.len())])
            .collect()
    };

    (0..count)
        .map(|i| {
            let name = pick(2).join(" ");
            let description = pick(12).join(" ");
            let skills: Vec<Value> = pick(3).into_iter().map(|s| json!({ "skill": s })).collect();
            json!({
                "code": format!("SY{}{:03}", 1 + i % 4, i),
                "name": name,
                "description": description,
                "mapped_skills": skills,
            })
        })
        .collect()
}
