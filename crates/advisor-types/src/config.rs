//! Configuration loading for the course advisor.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/course-advisor/config.toml`.
//! Environment variables use the `ADVISOR_` prefix and `__` for nesting,
//! e.g. `ADVISOR_HTTP_PORT=9000` or `ADVISOR_EMBEDDING__BACKEND=hash`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AdvisorError;

const APP_NAME: &str = "course-advisor";

/// Which embedding implementation backs the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 through Candle (downloads model files once)
    #[default]
    Candle,
    /// FNV-1a feature hashing; offline and deterministic
    Hash,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// HuggingFace repository for the Candle backend
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Model file cache directory (defaults to the user cache dir)
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// Vector dimension for the hash backend
    #[serde(default = "default_hash_dimension")]
    pub dimension: usize,
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_hash_dimension() -> usize {
    384
}

impl EmbeddingSettings {
    /// Model cache directory with `~` expanded, if configured
    pub fn expanded_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_repo: default_model_repo(),
            cache_dir: None,
            dimension: default_hash_dimension(),
        }
    }
}

/// Ranking parameters for the query matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// Results returned when the caller does not ask for a count
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Size of the candidate window taken before truncation
    #[serde(default = "default_candidates_k")]
    pub candidates_k: usize,

    /// How many times the course name is repeated in its document
    #[serde(default = "default_title_weight")]
    pub title_weight: usize,
}

fn default_top_k() -> usize {
    30
}

fn default_candidates_k() -> usize {
    50
}

fn default_title_weight() -> usize {
    3
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            candidates_k: default_candidates_k(),
            title_weight: default_title_weight(),
        }
    }
}

impl MatcherSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_top_k == 0 {
            return Err("default_top_k must be > 0".to_string());
        }
        if self.candidates_k == 0 {
            return Err("candidates_k must be > 0".to_string());
        }
        if self.title_weight == 0 {
            return Err("title_weight must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the course collection (JSON array of course records)
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub matcher: MatcherSettings,
}

fn default_corpus_path() -> String {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().join("final_mapped_data.json"))
        .unwrap_or_else(|| PathBuf::from("./data/final_mapped_data.json"))
        .to_string_lossy()
        .to_string()
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            http_host: default_http_host(),
            http_port: default_http_port(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            matcher: MatcherSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/course-advisor/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ADVISOR_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, AdvisorError> {
        Self::load_with_env(cli_config_path, advisor_environment())
    }

    fn load_with_env(
        cli_config_path: Option<&str>,
        environment: Environment,
    ) -> Result<Self, AdvisorError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("corpus_path", default_corpus_path())?
            .set_default("http_host", default_http_host())?
            .set_default("http_port", default_http_port() as i64)?
            .set_default("log_level", default_log_level())?
            .set_default("embedding.model_repo", default_model_repo())?
            .set_default("embedding.dimension", default_hash_dimension() as i64)?
            .set_default("matcher.default_top_k", default_top_k() as i64)?
            .set_default("matcher.candidates_k", default_candidates_k() as i64)?
            .set_default("matcher.title_weight", default_title_weight() as i64)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(environment);

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints after loading or CLI overrides.
    pub fn validate(&self) -> Result<(), AdvisorError> {
        self.matcher.validate().map_err(AdvisorError::Config)?;
        if self.embedding.dimension == 0 {
            return Err(AdvisorError::Config(
                "embedding.dimension must be > 0".to_string(),
            ));
        }
        if self.corpus_path.trim().is_empty() {
            return Err(AdvisorError::Config("corpus_path must be set".to_string()));
        }
        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Corpus path with `~` expanded
    pub fn expanded_corpus_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.corpus_path).as_ref())
    }
}

fn advisor_environment() -> Environment {
    Environment::with_prefix("ADVISOR")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        advisor_environment().source(Some(map))
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.http_port, 8000);
        assert_eq!(settings.http_host, "0.0.0.0");
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Candle);
        assert_eq!(settings.matcher.default_top_k, 30);
        assert_eq!(settings.matcher.candidates_k, 50);
        assert_eq!(settings.matcher.title_weight, 3);
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load_with_env(None, env_from(&[])).unwrap();
        assert_eq!(settings.http_port, 8000);
        assert!(settings.corpus_path.ends_with("final_mapped_data.json"));
    }

    #[test]
    fn test_env_overrides() {
        let env = env_from(&[
            ("ADVISOR_HTTP_PORT", "9100"),
            ("ADVISOR_CORPUS_PATH", "/srv/courses.json"),
            ("ADVISOR_EMBEDDING__BACKEND", "hash"),
            ("ADVISOR_MATCHER__CANDIDATES_K", "80"),
        ]);
        let settings = Settings::load_with_env(None, env).unwrap();
        assert_eq!(settings.http_port, 9100);
        assert_eq!(settings.corpus_path, "/srv/courses.json");
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Hash);
        assert_eq!(settings.matcher.candidates_k, 80);
        assert_eq!(settings.matcher.default_top_k, 30);
    }

    #[test]
    fn test_cli_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "corpus_path = \"/data/courses.json\"\nhttp_port = 8123\n\n[matcher]\ndefault_top_k = 10"
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let settings = Settings::load_with_env(Some(&path), env_from(&[])).unwrap();
        assert_eq!(settings.corpus_path, "/data/courses.json");
        assert_eq!(settings.http_port, 8123);
        assert_eq!(settings.matcher.default_top_k, 10);
        assert_eq!(settings.matcher.candidates_k, 50);
    }

    #[test]
    fn test_missing_cli_config_file_is_error() {
        let result = Settings::load_with_env(Some("/nonexistent/advisor.toml"), env_from(&[]));
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let env = env_from(&[("ADVISOR_MATCHER__CANDIDATES_K", "0")]);
        let result = Settings::load_with_env(None, env);
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }

    #[test]
    fn test_http_addr() {
        let settings = Settings::default();
        assert_eq!(settings.http_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_expanded_corpus_path() {
        let settings = Settings {
            corpus_path: "/abs/courses.json".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.expanded_corpus_path(), PathBuf::from("/abs/courses.json"));
        assert!(settings.embedding.expanded_cache_dir().is_none());
    }
}
