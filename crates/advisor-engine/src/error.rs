//! Engine error types.

use std::path::PathBuf;

use advisor_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors returned by engine operations.
///
/// Load-time errors (`DataNotFound`, `DataCorrupt`, and `EncodingFailure`
/// while building the index) leave the engine not ready. Query-time errors
/// affect only the failing call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Corpus source does not exist
    #[error("Course data not found: {}", .0.display())]
    DataNotFound(PathBuf),

    /// Corpus source exists but cannot be read or parsed
    #[error("Course data corrupt ({}): {reason}", path.display())]
    DataCorrupt { path: PathBuf, reason: String },

    /// `recommend` called before a successful `load_resources`
    #[error("Engine not loaded. Call load_resources() first")]
    NotReady,

    /// Embedding model failed or returned unusable vectors
    #[error("Encoding failure: {0}")]
    EncodingFailure(#[from] EmbeddingError),

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// Stable machine-readable name for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::DataNotFound(_) => "data_not_found",
            EngineError::DataCorrupt { .. } => "data_corrupt",
            EngineError::NotReady => "not_ready",
            EngineError::EncodingFailure(_) => "encoding_failure",
            EngineError::InvalidInput(_) => "invalid_input",
        }
    }
}
