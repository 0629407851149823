//! Embedding index over the corpus.
//!
//! One row per course, in corpus order, produced by a single batch call to
//! the embedding model. The index is read-only once built.

use std::time::Instant;

use tracing::info;

use advisor_embeddings::{Embedding, EmbeddingError, EmbeddingModel};

use crate::corpus::Corpus;
use crate::document::compose_with_weight;
use crate::error::EngineError;

/// Dense `N x D` embedding matrix aligned with a `Corpus`.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    rows: Vec<Embedding>,
    dimension: usize,
}

impl EmbeddingIndex {
    /// Compose one document per course and embed them all in one call.
    ///
    /// Fails with `EncodingFailure` if the model errors, returns a different
    /// number of rows than courses, or returns rows of differing width.
    pub fn build(
        corpus: &Corpus,
        embedder: &dyn EmbeddingModel,
        title_weight: usize,
    ) -> Result<Self, EngineError> {
        let start = Instant::now();
        let documents: Vec<String> = corpus
            .iter()
            .map(|course| compose_with_weight(course, title_weight))
            .collect();

        info!(
            courses = documents.len(),
            model = %embedder.info().name,
            "Creating vector embeddings"
        );
        let rows = embedder.embed_texts(&documents)?;

        if rows.len() != documents.len() {
            return Err(EmbeddingError::RowCountMismatch {
                expected: documents.len(),
                actual: rows.len(),
            }
            .into());
        }

        let dimension = rows
            .first()
            .map(Embedding::dimension)
            .unwrap_or(embedder.info().dimension);
        if let Some(bad) = rows.iter().find(|r| r.dimension() != dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            }
            .into());
        }

        info!(
            rows = rows.len(),
            dim = dimension,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Embedding index built"
        );

        Ok(Self { rows, dimension })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Vector width shared by every row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding for the course at corpus position `index`.
    pub fn row(&self, index: usize) -> Option<&Embedding> {
        self.rows.get(index)
    }

    /// Cosine similarity of `query` against every row, in corpus order.
    pub fn similarities(&self, query: &Embedding) -> Result<Vec<f32>, EngineError> {
        if !self.rows.is_empty() && query.dimension() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.dimension(),
            }
            .into());
        }
        Ok(self
            .rows
            .iter()
            .map(|row| query.cosine_similarity(row))
            .collect())
    }
}
