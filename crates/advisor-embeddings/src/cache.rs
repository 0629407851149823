//! Local store for sentence-transformer files.
//!
//! Files are fetched from HuggingFace Hub once and kept under
//! `<user cache>/course-advisor/models/<owner>_<repo>/`. Only files that are
//! missing are fetched, so an interrupted download resumes where it stopped.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Sentence-transformer used when none is configured
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Files a BERT embedder needs
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Where one model repository lives on disk.
#[derive(Debug, Clone)]
pub struct ModelCache {
    /// Root of the model store
    pub cache_dir: PathBuf,
    /// HuggingFace repository, `owner/name`
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::for_repo(None, DEFAULT_MODEL_REPO)
    }
}

fn user_model_store() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("course-advisor")
        .join("models")
}

impl ModelCache {
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Store for `repo_id` under `cache_dir`, or the user cache when unset.
    pub fn for_repo(cache_dir: Option<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self::new(cache_dir.unwrap_or_else(user_model_store), repo_id)
    }

    /// Directory holding this repository's files.
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }

    /// Required files not yet on disk.
    pub fn missing_files(&self) -> Vec<&'static str> {
        MODEL_FILES
            .iter()
            .copied()
            .filter(|f| !self.file_path(f).is_file())
            .collect()
    }

    pub fn is_cached(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Repository name without its owner, e.g. `all-MiniLM-L6-v2`.
    pub fn model_name(&self) -> &str {
        self.repo_id
            .rsplit_once('/')
            .map_or(self.repo_id.as_str(), |(_, name)| name)
    }
}

/// Resolved model file locations.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        }
    }
}

/// Make sure every model file is on disk, fetching the missing ones.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let missing = cache.missing_files();
    if missing.is_empty() {
        debug!(dir = %cache.model_dir().display(), "Model files present");
    } else {
        info!(repo = %cache.repo_id, files = ?missing, "Fetching model files");
        fetch_files(cache, &missing)?;
    }
    Ok(ModelPaths::in_dir(&cache.model_dir()))
}

/// Copy `files` out of the hf-hub cache into the model store. Each file is
/// written beside its final name and renamed into place, so a partial copy
/// never counts as cached.
fn fetch_files(cache: &ModelCache, files: &[&str]) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());
    std::fs::create_dir_all(cache.model_dir())?;

    for &file in files {
        let fetched = repo
            .get(file)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", file, e)))?;

        let dest = cache.file_path(file);
        let partial = dest.with_extension("partial");
        std::fs::copy(&fetched, &partial)?;
        std::fs::rename(&partial, &dest)?;
        debug!(file, dest = %dest.display(), "Model file stored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_store() {
        let cache = ModelCache::default();
        assert!(cache.cache_dir.ends_with("course-advisor/models"));
        assert_eq!(cache.repo_id, DEFAULT_MODEL_REPO);
        assert_eq!(cache.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_model_name_without_owner() {
        assert_eq!(ModelCache::new("/tmp", "local-model").model_name(), "local-model");
    }

    #[test]
    fn test_missing_files_tracks_partial_store() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::for_repo(Some(temp.path().to_path_buf()), "test/model");
        assert_eq!(cache.missing_files(), MODEL_FILES.to_vec());

        std::fs::create_dir_all(cache.model_dir()).unwrap();
        std::fs::write(cache.file_path("config.json"), b"{}").unwrap();
        assert_eq!(
            cache.missing_files(),
            vec!["tokenizer.json", "model.safetensors"]
        );
        assert!(!cache.is_cached());

        for f in MODEL_FILES {
            std::fs::write(cache.file_path(f), b"stub").unwrap();
        }
        assert!(cache.is_cached());
        assert!(cache.model_dir().ends_with("test_model"));
    }

    #[test]
    fn test_paths_resolve_into_model_dir() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "owner/repo");
        let paths = ModelPaths::in_dir(&cache.model_dir());
        assert_eq!(paths.weights, cache.file_path("model.safetensors"));
        assert_eq!(paths.tokenizer, cache.file_path("tokenizer.json"));
    }
}
