//! # advisor-engine
//!
//! Semantic matching between free-text career goals and a course corpus.
//!
//! Loading runs once, leaf-first: the corpus loader reads and normalizes
//! course records, the document composer turns each course into one text,
//! and the embedding index embeds those texts in a single batch. After that
//! every query only touches the query matcher, which embeds the goal with
//! the same model and ranks courses by cosine similarity.
//!
//! ## Guarantees
//! - Skill names are unique per course (case-insensitive, first seen wins)
//! - Index row `i` always belongs to corpus course `i`
//! - Nothing is exposed until corpus and index are both complete
//! - Queries never mutate shared state and may run concurrently

pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod stats;

pub use corpus::{load_corpus, parse_corpus, Corpus};
pub use document::{compose, compose_with_weight, TITLE_WEIGHT};
pub use engine::{AdvisorEngine, EmbedderSource, EngineSnapshot, EngineState, EngineStatus};
pub use error::EngineError;
pub use index::EmbeddingIndex;
pub use matcher::{derive_level, rank, round_score, select_candidates, Candidate, CANDIDATES_K, DEFAULT_TOP_K};
pub use stats::CorpusStats;
