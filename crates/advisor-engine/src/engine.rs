//! Advisor engine lifecycle.
//!
//! An `AdvisorEngine` starts `Unloaded`. `load_resources` loads the corpus,
//! resolves the embedding model and builds the index; only when all three
//! succeed is a snapshot published and the engine `Ready`. Any failure
//! leaves it `Failed` with nothing exposed, and a later call may retry.
//!
//! Queries clone the published snapshot handle and run without holding any
//! lock, so concurrent `recommend` calls never block one another.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use advisor_embeddings::{load_embedder, EmbeddingModel};
use advisor_types::{EmbeddingSettings, MatcherSettings, Recommendation, Settings};

use crate::corpus::{load_corpus, Corpus};
use crate::error::EngineError;
use crate::index::EmbeddingIndex;
use crate::matcher::rank;

/// Where the engine gets its embedding model.
#[derive(Clone)]
pub enum EmbedderSource {
    /// Build from settings during `load_resources`
    Configured(EmbeddingSettings),
    /// Use an already constructed model
    Shared(Arc<dyn EmbeddingModel>),
}

impl EmbedderSource {
    fn resolve(&self) -> Result<Arc<dyn EmbeddingModel>, EngineError> {
        match self {
            EmbedderSource::Configured(settings) => Ok(load_embedder(settings)?),
            EmbedderSource::Shared(model) => Ok(model.clone()),
        }
    }
}

/// Everything a query needs, frozen at load time.
pub struct EngineSnapshot {
    corpus: Corpus,
    index: EmbeddingIndex,
    embedder: Arc<dyn EmbeddingModel>,
    loaded_at: DateTime<Utc>,
}

impl EngineSnapshot {
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn model_name(&self) -> &str {
        &self.embedder.info().name
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

enum LoadState {
    Unloaded,
    Ready(Arc<EngineSnapshot>),
    Failed(String),
}

/// Lifecycle state as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Unloaded,
    Ready,
    Failed,
}

/// Point-in-time engine status, e.g. for a health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub state: EngineState,
    pub ready: bool,
    pub courses: usize,
    pub dimension: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Semantic course recommender over one corpus file.
pub struct AdvisorEngine {
    corpus_path: PathBuf,
    embedder: EmbedderSource,
    matcher: MatcherSettings,
    state: RwLock<LoadState>,
    load_guard: Mutex<()>,
}

impl AdvisorEngine {
    pub fn new(
        corpus_path: impl Into<PathBuf>,
        embedder: EmbedderSource,
        matcher: MatcherSettings,
    ) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            embedder,
            matcher,
            state: RwLock::new(LoadState::Unloaded),
            load_guard: Mutex::new(()),
        }
    }

    /// Engine configured entirely from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.expanded_corpus_path(),
            EmbedderSource::Configured(settings.embedding.clone()),
            settings.matcher.clone(),
        )
    }

    /// Engine using an existing model with default matcher settings.
    pub fn with_embedder(corpus_path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self::new(
            corpus_path,
            EmbedderSource::Shared(embedder),
            MatcherSettings::default(),
        )
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    pub fn matcher_settings(&self) -> &MatcherSettings {
        &self.matcher
    }

    /// Load corpus, model and index, then mark the engine ready.
    ///
    /// Blocking and CPU/IO heavy. A no-op once ready. On failure the engine
    /// is `Failed` and the error is returned; calling again retries.
    pub fn load_resources(&self) -> Result<(), EngineError> {
        let _guard = self.load_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_ready() {
            debug!("Engine already loaded");
            return Ok(());
        }

        let start = Instant::now();
        match self.build_snapshot() {
            Ok(snapshot) => {
                info!(
                    courses = snapshot.corpus.len(),
                    dim = snapshot.index.dimension(),
                    model = %snapshot.model_name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Engine ready"
                );
                *self.write_state() = LoadState::Ready(Arc::new(snapshot));
                Ok(())
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Engine failed to load");
                *self.write_state() = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn build_snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        let corpus = load_corpus(&self.corpus_path)?;
        let embedder = self.embedder.resolve()?;
        let index = EmbeddingIndex::build(&corpus, embedder.as_ref(), self.matcher.title_weight)?;

        Ok(EngineSnapshot {
            corpus,
            index,
            embedder,
            loaded_at: Utc::now(),
        })
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LoadState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LoadState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True once `load_resources` has completed successfully.
    pub fn is_ready(&self) -> bool {
        matches!(*self.read_state(), LoadState::Ready(_))
    }

    /// The published snapshot, or `NotReady`.
    pub fn snapshot(&self) -> Result<Arc<EngineSnapshot>, EngineError> {
        match &*self.read_state() {
            LoadState::Ready(snapshot) => Ok(snapshot.clone()),
            _ => Err(EngineError::NotReady),
        }
    }

    pub fn status(&self) -> EngineStatus {
        match &*self.read_state() {
            LoadState::Unloaded => EngineStatus {
                state: EngineState::Unloaded,
                ready: false,
                courses: 0,
                dimension: 0,
                model: None,
                loaded_at: None,
                error: None,
            },
            LoadState::Ready(snapshot) => EngineStatus {
                state: EngineState::Ready,
                ready: true,
                courses: snapshot.corpus.len(),
                dimension: snapshot.index.dimension(),
                model: Some(snapshot.model_name().to_string()),
                loaded_at: Some(snapshot.loaded_at),
                error: None,
            },
            LoadState::Failed(message) => EngineStatus {
                state: EngineState::Failed,
                ready: false,
                courses: 0,
                dimension: 0,
                model: None,
                loaded_at: None,
                error: Some(message.clone()),
            },
        }
    }

    /// Rank courses against a free-text goal.
    ///
    /// Returns `min(top_k, candidates_k, N)` results, best first. Fails with
    /// `NotReady` before loading, `InvalidInput` for a blank goal or a zero
    /// `top_k`, and `EncodingFailure` if the goal cannot be embedded.
    pub fn recommend(&self, goal: &str, top_k: usize) -> Result<Vec<Recommendation>, EngineError> {
        let snapshot = self.snapshot()?;

        if goal.trim().is_empty() {
            return Err(EngineError::InvalidInput("goal must not be empty".to_string()));
        }
        if top_k == 0 {
            return Err(EngineError::InvalidInput("top_k must be > 0".to_string()));
        }

        let query = snapshot.embedder.embed(goal)?;
        let scores = snapshot.index.similarities(&query)?;
        let results = rank(&snapshot.corpus, &scores, top_k, self.matcher.candidates_k);

        debug!(top_k, results = results.len(), "Recommendation complete");
        Ok(results)
    }

    /// `recommend` with the configured default result count.
    pub fn recommend_default(&self, goal: &str) -> Result<Vec<Recommendation>, EngineError> {
        self.recommend(goal, self.matcher.default_top_k)
    }
}
