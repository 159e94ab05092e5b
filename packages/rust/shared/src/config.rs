//! Application configuration for SourceBrief.
//!
//! User config lives at `~/.sourcebrief/sourcebrief.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceBriefError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sourcebrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sourcebrief";

// ---------------------------------------------------------------------------
// Config structs (matching sourcebrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Retrieval defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of source locations to request from search.
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Maximum text fragments extracted per source.
    #[serde(default = "default_max_fragments")]
    pub max_fragments_per_source: usize,

    /// Per-source fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Optional word budget for the condensed answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
            max_fragments_per_source: default_max_fragments(),
            fetch_timeout_secs: default_fetch_timeout(),
            max_words: None,
        }
    }
}

fn default_max_sources() -> usize {
    5
}
fn default_max_fragments() -> usize {
    3
}
fn default_fetch_timeout() -> u64 {
    3
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Provider to use: "searxng" or "brave".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the SearXNG instance to query.
    #[serde(default = "default_searxng_base_url")]
    pub searxng_base_url: String,

    /// Name of the env var holding the Brave API key (never store the key itself).
    #[serde(default = "default_brave_api_key_env")]
    pub brave_api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            searxng_base_url: default_searxng_base_url(),
            brave_api_key_env: default_brave_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "searxng".into()
}
fn default_searxng_base_url() -> String {
    "https://searx.be".into()
}
fn default_brave_api_key_env() -> String {
    "BRAVE_SEARCH_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Retrieval config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime retrieval bounds — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum source locations requested from search.
    pub max_sources: usize,
    /// Maximum text fragments extracted per source.
    pub max_fragments_per_source: usize,
    /// Optional word budget for the condensed answer.
    pub max_words: Option<usize>,
    /// Per-source fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl RetrievalConfig {
    /// Check the bounds the pipeline contract requires.
    pub fn validate(&self) -> Result<()> {
        if self.max_sources < 1 {
            return Err(SourceBriefError::validation("max_sources must be >= 1"));
        }
        if self.max_fragments_per_source < 1 {
            return Err(SourceBriefError::validation(
                "max_fragments_per_source must be >= 1",
            ));
        }
        if self.max_words == Some(0) {
            return Err(SourceBriefError::validation("max_words must be positive"));
        }
        Ok(())
    }
}

impl From<&AppConfig> for RetrievalConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_sources: config.defaults.max_sources,
            max_fragments_per_source: config.defaults.max_fragments_per_source,
            max_words: config.defaults.max_words,
            fetch_timeout_secs: config.defaults.fetch_timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sourcebrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SourceBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sourcebrief/sourcebrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceBriefError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SourceBriefError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SourceBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SourceBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SourceBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the Brave API key env var is set and non-empty.
/// Only required when the Brave provider is selected.
pub fn validate_brave_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.search.brave_api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(SourceBriefError::config(format!(
            "Brave Search API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://brave.com/search/api/"
        ))),
    }
}
