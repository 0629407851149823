use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use advisor_embeddings::{load_embedder, EmbeddingModel, HashEmbedder};
use advisor_types::{EmbeddingSettings, MatcherSettings};
use e2e_tests::{synthetic_records, TestHarness};

const SMALL_COURSE_COUNT: usize = 500;
const MEDIUM_COURSE_COUNT: usize = 5_000;
const DEFAULT_ITERATIONS: usize = 50;

const GOALS: &[&str] = &[
    "I want to learn Artificial Intelligence",
    "data analysis for finance",
    "network security engineer",
    "robotics and signal processing",
    "marketing management career",
];

#[derive(Parser, Debug)]
#[command(name = "perf_bench", about = "Course advisor performance benchmark harness")]
struct Args {
    #[arg(long, value_enum, default_value = "small")]
    tier: DatasetTier,
    #[arg(long, value_enum, default_value = "hash")]
    backend: Backend,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,
    #[arg(long, default_value_t = 30)]
    top_k: usize,
    /// Write the JSON report here in addition to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum DatasetTier {
    Small,
    Medium,
}

impl DatasetTier {
    fn course_count(&self) -> usize {
        match self {
            DatasetTier::Small => SMALL_COURSE_COUNT,
            DatasetTier::Medium => MEDIUM_COURSE_COUNT,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum Backend {
    Hash,
    Candle,
}

#[derive(Debug, Serialize)]
struct LatencyStats {
    p50_ms: f64,
    p95_ms: f64,
    max_ms: f64,
}

impl LatencyStats {
    fn from_samples(mut samples: Vec<f64>) -> Self {
        samples.sort_by(f64::total_cmp);
        let pick = |q: f64| {
            samples
                .get(((samples.len() as f64 - 1.0) * q).round() as usize)
                .copied()
                .unwrap_or(0.0)
        };
        Self {
            p50_ms: pick(0.50),
            p95_ms: pick(0.95),
            max_ms: samples.last().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    tier: DatasetTier,
    backend: Backend,
    courses: usize,
    model: String,
    load_ms: f64,
    queries: usize,
    query: LatencyStats,
}

fn embedder(backend: Backend) -> Arc<dyn EmbeddingModel> {
    match backend {
        Backend::Hash => Arc::new(HashEmbedder::default()),
        Backend::Candle => {
            load_embedder(&EmbeddingSettings::default()).expect("Failed to load Candle model")
        }
    }
}

fn main() {
    let args = Args::parse();
    let courses = args.tier.course_count();

    let harness = TestHarness::with_records(&synthetic_records(courses, 2024));
    let engine = harness.engine_with(embedder(args.backend), MatcherSettings::default());

    let start = Instant::now();
    engine.load_resources().expect("Failed to load engine");
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut samples = Vec::with_capacity(args.iterations * GOALS.len());
    for _ in 0..args.iterations {
        for goal in GOALS {
            let start = Instant::now();
            let results = engine.recommend(goal, args.top_k).expect("Query failed");
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert!(results.len() <= args.top_k);
        }
    }

    let report = Report {
        tier: args.tier,
        backend: args.backend,
        courses,
        model: engine.status().model.unwrap_or_default(),
        load_ms,
        queries: samples.len(),
        query: LatencyStats::from_samples(samples),
    };

    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize report");
    println!("{json}");
    if let Some(path) = args.out {
        std::fs::write(&path, &json).expect("Failed to write report");
    }
}
