//! Application configuration for ArticleForge.
//!
//! User config lives at `~/.articleforge/articleforge.toml`.
//! Secrets are never stored in the file — the config names the env vars
//! that hold them, and [`RuntimeConfig::resolve`] reads them once at
//! process entry. A missing secret is fatal before any stage runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArticleForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "articleforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".articleforge";

// ---------------------------------------------------------------------------
// Config structs (matching articleforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Article storage API settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Web-search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Generative rewrite provider settings.
    #[serde(default)]
    pub rewrite: RewriteConfig,

    /// Content size and timeout limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Article API base URL. May be left empty and supplied via env.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Env var consulted when `base_url` is not set in the file.
    #[serde(default = "default_storage_url_env")]
    pub base_url_env: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            base_url_env: default_storage_url_env(),
        }
    }
}

fn default_storage_url_env() -> String {
    "ARTICLE_API_URL".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search provider endpoint.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Host substrings to exclude from results: the system's own
    /// publishing domain and video hosts with no extractable text.
    #[serde(default = "default_excluded_hosts")]
    pub excluded_hosts: Vec<String>,

    /// Number of results to request from the provider.
    #[serde(default = "default_result_count")]
    pub result_count: u32,

    /// Maximum reference links carried into a pipeline run.
    #[serde(default = "default_max_references")]
    pub max_references: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            api_key_env: default_search_key_env(),
            excluded_hosts: default_excluded_hosts(),
            result_count: default_result_count(),
            max_references: default_max_references(),
        }
    }
}

fn default_search_base_url() -> String {
    "https://serpapi.com/search".into()
}
fn default_search_key_env() -> String {
    "SERP_API_KEY".into()
}
fn default_excluded_hosts() -> Vec<String> {
    vec!["beyondchats.com".into(), "youtube.com".into()]
}
fn default_result_count() -> u32 {
    8
}
fn default_max_references() -> usize {
    2
}

/// `[rewrite]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Generative model API base URL.
    #[serde(default = "default_rewrite_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_rewrite_key_env")]
    pub api_key_env: String,

    /// Model to use for the rewrite call.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            base_url: default_rewrite_base_url(),
            api_key_env: default_rewrite_key_env(),
            model: default_model(),
        }
    }
}

fn default_rewrite_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_rewrite_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.5-flash-lite".into()
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters kept per reference excerpt, and maximum
    /// original-content characters fed to the rewrite prompt.
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,

    /// Per-URL page fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            excerpt_max_chars: default_excerpt_max_chars(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_excerpt_max_chars() -> usize {
    6000
}
fn default_fetch_timeout_secs() -> u64 {
    8
}

// ---------------------------------------------------------------------------
// Runtime config (resolved from config file + environment)
// ---------------------------------------------------------------------------

/// Fully resolved runtime configuration with secrets in place.
///
/// Constructed once at process entry and passed by reference into every
/// component constructor — stage logic never reads the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Article storage API base URL.
    pub storage_base_url: String,
    /// Search provider endpoint.
    pub search_base_url: String,
    /// Search provider API key.
    pub search_api_key: String,
    /// Host substrings excluded from discovery results.
    pub excluded_hosts: Vec<String>,
    /// Results requested per search call.
    pub result_count: u32,
    /// Maximum reference links per run.
    pub max_references: usize,
    /// Generative model API base URL.
    pub rewrite_base_url: String,
    /// Generative model API key.
    pub rewrite_api_key: String,
    /// Model identifier for the rewrite call.
    pub model: String,
    /// Maximum excerpt/prompt content characters.
    pub excerpt_max_chars: usize,
    /// Per-URL fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl RuntimeConfig {
    /// Resolve the three required secrets/endpoints from the config and
    /// environment. Any missing one is a fatal precondition failure.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        let storage_base_url = match &config.storage.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => require_env(&config.storage.base_url_env, "article storage API base URL")?,
        };
        let search_api_key = require_env(&config.search.api_key_env, "search provider API key")?;
        let rewrite_api_key =
            require_env(&config.rewrite.api_key_env, "generative model API key")?;

        Ok(Self {
            storage_base_url,
            search_base_url: config.search.base_url.clone(),
            search_api_key,
            excluded_hosts: config.search.excluded_hosts.clone(),
            result_count: config.search.result_count,
            max_references: config.search.max_references,
            rewrite_base_url: config.rewrite.base_url.clone(),
            rewrite_api_key,
            model: config.rewrite.model.clone(),
            excerpt_max_chars: config.limits.excerpt_max_chars,
            fetch_timeout_secs: config.limits.fetch_timeout_secs,
        })
    }
}

/// Read a required env var, trimming whitespace.
fn require_env(var_name: &str, what: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(ArticleForgeError::config(format!(
            "{what} not found. Set the {var_name} environment variable."
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.articleforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ArticleForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.articleforge/articleforge.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ArticleForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ArticleForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ArticleForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArticleForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ArticleForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("SERP_API_KEY"));
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("serpapi.com"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.limits.excerpt_max_chars, 6000);
        assert_eq!(parsed.limits.fetch_timeout_secs, 8);
        assert_eq!(parsed.search.max_references, 2);
        assert_eq!(parsed.search.result_count, 8);
    }

    #[test]
    fn excluded_hosts_default_covers_own_domain_and_video() {
        let config = AppConfig::default();
        assert!(config.search.excluded_hosts.iter().any(|h| h == "beyondchats.com"));
        assert!(config.search.excluded_hosts.iter().any(|h| h == "youtube.com"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[storage]
base_url = "http://localhost:8000/api/articles"

[search]
excluded_hosts = ["example.org"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(
            config.storage.base_url.as_deref(),
            Some("http://localhost:8000/api/articles")
        );
        assert_eq!(config.search.excluded_hosts, vec!["example.org".to_string()]);
        assert_eq!(config.rewrite.model, "gemini-2.5-flash-lite");
    }

    #[test]
    fn resolve_fails_on_missing_secret() {
        let mut config = AppConfig::default();
        config.storage.base_url = Some("http://localhost:8000/api/articles".into());
        // Unique env var names to avoid interfering with other tests
        config.search.api_key_env = "AF_TEST_NONEXISTENT_SERP_KEY".into();
        config.rewrite.api_key_env = "AF_TEST_NONEXISTENT_GEMINI_KEY".into();

        let result = RuntimeConfig::resolve(&config);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("AF_TEST_NONEXISTENT_SERP_KEY")
        );
    }
}
