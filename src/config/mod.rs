//! Configuration management.
//!
//! Settings come from the process environment after the env file has been
//! loaded into it. Every key is prefixed with `ARXIVIST_` and nested
//! sections are separated by a double underscore:
//!
//! ```text
//! ARXIVIST_DATABASE__PATH=library.db
//! ARXIVIST_DOWNLOADS__DIRECTORY=./papers
//! ARXIVIST_SEARCH__PAGE_SIZE=10
//! ARXIVIST_REFERENCES__API_KEY=...
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sources::{ARXIV_API_URL, SEMANTIC_API_BASE};

/// Prefix of every environment variable read by [`load_config`]
pub const ENV_PREFIX: &str = "ARXIVIST";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Library database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// PDF download settings
    #[serde(default)]
    pub downloads: DownloadConfig,

    /// Search session settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Reference lookup settings
    #[serde(default)]
    pub references: ReferencesConfig,
}

/// Library database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("arxivist.db")
}

/// Download configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Directory receiving the PDFs of saved papers
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./papers")
}

/// Search session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Characters removed from query terms
    #[serde(default = "default_strip_chars")]
    pub strip_chars: String,

    /// arXiv export API endpoint
    #[serde(default = "default_arxiv_api_url")]
    pub api_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            strip_chars: default_strip_chars(),
            api_url: default_arxiv_api_url(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_strip_chars() -> String {
    " \t\"'".to_string()
}

fn default_arxiv_api_url() -> String {
    ARXIV_API_URL.to_string()
}

/// Reference lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReferencesConfig {
    /// Semantic Scholar graph API endpoint
    #[serde(default = "default_semantic_api_url")]
    pub api_url: String,

    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum references stored per paper
    #[serde(default = "default_max_references")]
    pub max_results: usize,

    /// Number of entries shown by the suggest mode
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            api_url: default_semantic_api_url(),
            api_key: None,
            max_results: default_max_references(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_semantic_api_url() -> String {
    SEMANTIC_API_BASE.to_string()
}

fn default_max_references() -> usize {
    100
}

fn default_suggestion_limit() -> usize {
    10
}

/// Errors raised while loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The env file does not exist
    #[error("path to config file {} doesn't exist", .0.display())]
    MissingEnvFile(PathBuf),

    /// The env file could not be parsed
    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// The settings could not be deserialized
    #[error("invalid configuration: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Load the key-value env file at `path` into the process environment.
///
/// Variables already set in the environment take precedence.
pub fn load_env_file(path: &Path) -> Result<(), ConfigLoadError> {
    if !path.exists() {
        return Err(ConfigLoadError::MissingEnvFile(path.to_path_buf()));
    }
    dotenvy::from_path(path)?;
    tracing::debug!(path = %path.display(), "Loaded env file");
    Ok(())
}

/// Build the configuration from `ARXIVIST_*` environment variables
pub fn load_config() -> Result<Config, ConfigLoadError> {
    from_environment(None)
}

/// Load the env file, then build the configuration
pub fn load(env_file: &Path) -> Result<Config, ConfigLoadError> {
    load_env_file(env_file)?;
    load_config()
}

fn from_environment(vars: Option<config::Map<String, String>>) -> Result<Config, ConfigLoadError> {
    let settings = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(vars),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
