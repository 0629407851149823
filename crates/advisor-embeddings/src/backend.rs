//! Backend selection from settings.

use std::sync::Arc;

use tracing::info;

use advisor_types::{EmbeddingBackend, EmbeddingSettings};

use crate::cache::ModelCache;
use crate::candle::CandleEmbedder;
use crate::error::EmbeddingError;
use crate::hashing::HashEmbedder;
use crate::model::EmbeddingModel;

/// Build the embedding model named by `settings`.
///
/// The Candle backend downloads model files on first use, so this may block
/// on network I/O; call it from a blocking context.
pub fn load_embedder(
    settings: &EmbeddingSettings,
) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> {
    match settings.backend {
        EmbeddingBackend::Candle => {
            let cache = ModelCache::for_repo(settings.expanded_cache_dir(), &settings.model_repo);
            info!(repo = %cache.repo_id, cache_dir = ?cache.cache_dir, "Using Candle embedder");
            Ok(Arc::new(CandleEmbedder::load(&cache)?))
        }
        EmbeddingBackend::Hash => {
            if settings.dimension == 0 {
                return Err(EmbeddingError::InvalidInput(
                    "embedding.dimension must be > 0".to_string(),
                ));
            }
            info!(dim = settings.dimension, "Using hash embedder");
            Ok(Arc::new(HashEmbedder::new(settings.dimension)))
        }
    }
}
