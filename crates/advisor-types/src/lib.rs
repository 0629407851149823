//! # advisor-types
//!
//! Shared domain types for the course advisor.
//!
//! This crate defines the data structures passed between crates:
//! - Course: an immutable course record with its mapped skills
//! - Recommendation: a ranked, per-query view over a matched course
//! - Settings: layered configuration for the daemon and engine
//!
//! ## Usage
//!
//! ```rust
//! use advisor_types::{Course, Settings};
//!
//! let course = Course::new("CS101", "Intro to AI", "Covers machine learning basics")
//!     .with_skills(["Python"]);
//! assert_eq!(course.mapped_skills.len(), 1);
//!
//! let settings = Settings::default();
//! assert_eq!(settings.matcher.default_top_k, 30);
//! ```

pub mod config;
pub mod course;
pub mod error;
pub mod recommendation;

pub use config::{EmbeddingBackend, EmbeddingSettings, MatcherSettings, Settings};
pub use course::{Course, SkillMapping};
pub use error::AdvisorError;
pub use recommendation::{Recommendation, UNKNOWN_LEVEL};
