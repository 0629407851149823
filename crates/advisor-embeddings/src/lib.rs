//! # advisor-embeddings
//!
//! Text embedding for course documents and career-goal queries.
//!
//! Every vector the engine compares must come from the same model, so the
//! engine holds exactly one `EmbeddingModel` for its lifetime and uses it
//! both to build the course index and to embed queries.
//!
//! ## Backends
//! - `CandleEmbedder`: all-MiniLM-L6-v2 (384 dimensions) via Candle, model
//!   files downloaded once from HuggingFace Hub and cached locally
//! - `HashEmbedder`: FNV-1a feature hashing, no model files, fully
//!   deterministic; suited to offline runs and tests

pub mod backend;
pub mod cache;
pub mod candle;
pub mod error;
pub mod hashing;
pub mod model;

pub use crate::candle::CandleEmbedder;
pub use backend::load_embedder;
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use hashing::HashEmbedder;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
