//! Hash embeddings.
//!
//! FNV-1a feature hashing over lower-cased word tokens and their character
//! trigrams. No model files and no randomness: the same text always maps to
//! the same vector, on every platform.
//!
//! Trigrams let inflected forms share signal ("learn" / "learning"); each
//! feature also hashes to a sign so unrelated collisions tend to cancel.

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default number of hash buckets, matching MiniLM's width.
pub const DEFAULT_HASH_DIM: usize = 384;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Hash embedder using FNV-1a
pub struct HashEmbedder {
    info: ModelInfo,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl HashEmbedder {
    /// Create embedder with specified dimension
    pub fn new(dim: usize) -> Self {
        Self {
            info: ModelInfo {
                name: format!("fnv1a-hash-{}", dim),
                dimension: dim,
                max_sequence_length: usize::MAX,
            },
        }
    }

    fn add_feature(&self, values: &mut [f32], key: &str, weight: f32) {
        let h = fnv1a(key.as_bytes());
        let bucket = (h % values.len() as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        values[bucket] += sign * weight;
    }
}

impl EmbeddingModel for HashEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if self.info.dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "hash embedder dimension must be > 0".to_string(),
            ));
        }

        let mut values = vec![0.0f32; self.info.dimension];
        for token in tokenize(text) {
            self.add_feature(&mut values, &format!("w:{}", token), WORD_WEIGHT);

            let padded: Vec<char> = format!("<{}>", token).chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut values, &format!("g:{}", gram), TRIGRAM_WEIGHT);
            }
        }

        Ok(Embedding::new(values))
    }
}

/// Lower-cased alphanumeric runs.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET;
    for b in bytes {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_dimension() {
        let embedder = HashEmbedder::new(64);
        let emb = embedder.embed("git commit workflow").unwrap();
        assert_eq!(emb.dimension(), 64);
        assert_eq!(embedder.info().dimension, 64);
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Data Structures and Algorithms").unwrap();
        let b = embedder.embed("Data Structures and Algorithms").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Machine Learning!").unwrap();
        let b = embedder.embed("machine   learning").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let emb = embedder.embed("  ...  ").unwrap();
        assert!(emb.values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("database systems").unwrap();
        let related = embedder.embed("Introduction to database systems").unwrap();
        let unrelated = embedder.embed("Renaissance oil painting").unwrap();
        assert!(query.cosine_similarity(&related) > query.cosine_similarity(&unrelated));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let embedder = HashEmbedder::new(0);
        assert!(matches!(
            embedder.embed("anything"),
            Err(EmbeddingError::InvalidInput(_))
        ));
    }
}
