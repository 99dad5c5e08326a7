use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cinematch_core::{Model, SelfExclusion};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};

/// Configuration for cinematch.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CINEMATCH_* prefix)
/// 3. Config file (~/.config/cinematch/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the catalog CSV and the matrix artifacts.
    ///
    /// Can be set via:
    /// - CLI: --data-dir /path/to/data
    /// - ENV: CINEMATCH_DATA_DIR
    /// - Config: data_dir = "/path/to/data"
    /// - Default: ~/.local/share/cinematch
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Catalog CSV file name inside `data_dir`.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// TMDb API key for poster lookups. Posters are `null` without one.
    ///
    /// Can be set via:
    /// - ENV: CINEMATCH_TMDB_API_KEY
    /// - Config: tmdb_api_key = "..."
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_base")]
    pub tmdb_api_base: String,

    /// Prefix joined with a search result's `poster_path`.
    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_image_base: String,

    #[serde(default = "default_poster_rps")]
    pub poster_requests_per_second: u32,

    /// HTTP listen address.
    ///
    /// Can be set via:
    /// - CLI: cinematch serve --bind 0.0.0.0:8080
    /// - ENV: CINEMATCH_BIND_ADDR
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Length of each model's ballot and of the final list.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// `identity` or `positional`.
    #[serde(default)]
    pub self_exclusion: SelfExclusion,

    /// Reject catalogs in which two rows normalize to the same title.
    #[serde(default)]
    pub strict_catalog: bool,

    /// Model name to download URL for matrices missing from `data_dir`.
    #[serde(default)]
    pub artifact_urls: BTreeMap<String, String>,

    /// Attempts for transient upstream failures, first try included.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_file: default_catalog_file(),
            tmdb_api_key: None,
            tmdb_api_base: default_tmdb_api_base(),
            tmdb_image_base: default_tmdb_image_base(),
            poster_requests_per_second: default_poster_rps(),
            bind_addr: default_bind_addr(),
            top_k: default_top_k(),
            self_exclusion: SelfExclusion::default(),
            strict_catalog: false,
            artifact_urls: BTreeMap::new(),
            retry_max_attempts: default_retry_max_attempts(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/cinematch/config.toml
    /// Reads environment variables with CINEMATCH_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("cinematch");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom data directory.
    ///
    /// This is used when the --data-dir CLI flag is provided.
    pub fn load_with_data_dir(data_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.data_dir = data_dir;
        Ok(config)
    }

    /// Full path of the catalog CSV.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    /// Full path of a model's matrix artifact.
    pub fn artifact_path(&self, model: Model) -> PathBuf {
        self.data_dir.join(model.artifact_file_name())
    }

    /// Download URL configured for a model's artifact, if any.
    pub fn artifact_url(&self, model: Model) -> Option<&str> {
        self.artifact_urls.get(model.name()).map(String::as_str)
    }
}

/// Get the default data directory.
///
/// Returns: ~/.local/share/cinematch (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cinematch")
}

fn default_catalog_file() -> String {
    String::from("preprocessed_movies.csv")
}

fn default_tmdb_api_base() -> String {
    String::from("https://api.themoviedb.org/3")
}

fn default_tmdb_image_base() -> String {
    String::from("https://image.tmdb.org/t/p/w500")
}

fn default_poster_rps() -> u32 {
    20
}

fn default_bind_addr() -> String {
    String::from("127.0.0.1:5000")
}

fn default_top_k() -> usize {
    cinematch_core::vote::DEFAULT_TOP_K
}

fn default_retry_max_attempts() -> usize {
    3
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cinematch/config.toml
/// - macOS: ~/Library/Application Support/cinematch/config.toml
/// - Windows: %APPDATA%\cinematch\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cinematch")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cinematch Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CINEMATCH_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory holding preprocessed_movies.csv and the similarity_*.bin matrices
#
# Can also be set via:
# - CLI: cinematch --data-dir /custom/path serve
# - Environment: CINEMATCH_DATA_DIR=/custom/path
#
# Default: Platform-specific data directory
#data_dir = "/path/to/cinematch/data"

# TMDb API key for poster lookups
# Without a key every recommendation is returned with "poster_url": null
#
# Register for a key at: https://www.themoviedb.org/settings/api
#
# Can also be set via:
# - Environment: CINEMATCH_TMDB_API_KEY=your-key-here
#tmdb_api_key = "your-tmdb-api-key-here"

# HTTP listen address for `cinematch serve`
#bind_addr = "127.0.0.1:5000"

# How the query title is kept out of its own results:
# - "identity": drop the query title wherever it ranks
# - "positional": drop the top-ranked entry (matches older deployments)
#self_exclusion = "identity"

# Refuse to start when two catalog rows share a title (case-insensitive)
#strict_catalog = false

# Download locations for matrices missing from data_dir
#[artifact_urls]
#tfidf = "https://example.com/similarity_tfidf.bin"
#lsi = "https://example.com/similarity_lsi.bin"
#bm25 = "https://example.com/similarity_bm25.bin"
#word2vec = "https://example.com/similarity_word2vec.bin"
#jaccard = "https://example.com/similarity_jaccard.bin"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.data_dir.as_os_str().is_empty());
        assert!(config.tmdb_api_key.is_none());
        assert_eq!(config.top_k, 5);
        assert_eq!(config.self_exclusion, SelfExclusion::Identity);
        assert!(!config.strict_catalog);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_data_dir() {
        let custom = PathBuf::from("/tmp/cinematch-data");
        let config = Config::load_with_data_dir(custom.clone()).unwrap();
        assert_eq!(config.data_dir, custom);
        assert_eq!(
            config.catalog_path(),
            custom.join("preprocessed_movies.csv")
        );
    }

    #[test]
    fn test_artifact_paths_and_urls() {
        let mut config = Config {
            data_dir: PathBuf::from("/data"),
            ..Config::default()
        };
        config
            .artifact_urls
            .insert("lsi".to_string(), "https://example.com/lsi.bin".to_string());

        assert_eq!(
            config.artifact_path(Model::Lsi),
            PathBuf::from("/data/similarity_lsi.bin")
        );
        assert_eq!(config.artifact_url(Model::Lsi), Some("https://example.com/lsi.bin"));
        assert_eq!(config.artifact_url(Model::Bm25), None);
    }

    #[test]
    fn test_example_config_parses() {
        let parsed: Config = toml::from_str(example_config()).unwrap();
        assert!(parsed.tmdb_api_key.is_none());
        assert_eq!(parsed.bind_addr, "127.0.0.1:5000");
        assert!(parsed.artifact_urls.is_empty());
    }
}
