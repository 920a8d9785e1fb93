//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `SCHOLAR_DIGEST__` (nested keys use
//! `__`, e.g. `SCHOLAR_DIGEST__CACHE__TTL_SECONDS=3600`).
//!
//! ```toml
//! [author]
//! id = "uC-4EagAAAAJ"
//!
//! [cache]
//! path = "scholar_cache.json"
//! ttl_seconds = 86400
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3001
//!
//! [http]
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! lookup_timeout_seconds = 45
//!
//! [sources]
//! crossref_rows = 5
//! semantic_candidates = 10
//! pubmed_enabled = false
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SCHOLAR_DIGEST";

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "scholar-digest.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub author: AuthorConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The author whose profile is aggregated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorConfig {
    /// Google Scholar profile identifier (the `user=` query parameter)
    #[serde(default = "default_author_id")]
    pub id: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            id: default_author_id(),
        }
    }
}

fn default_author_id() -> String {
    "uC-4EagAAAAJ".to_string()
}

/// Cache file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path of the JSON cache file
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Age after which the cached aggregation is stale
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("scholar_cache.json")
}

fn default_cache_ttl() -> u64 {
    24 * 3600 // 24 hours
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout for a single upstream request
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Upper bound for one abstract source lookup (which may issue several requests)
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            lookup_timeout_seconds: default_lookup_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_seconds)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_lookup_timeout() -> u64 {
    45
}

/// Abstract source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Number of Crossref matches inspected per title
    #[serde(default = "default_crossref_rows")]
    pub crossref_rows: usize,

    /// Contact address sent to Crossref (polite pool)
    #[serde(default)]
    pub crossref_mailto: Option<String>,

    /// Number of Semantic Scholar search candidates inspected per title
    #[serde(default = "default_semantic_candidates")]
    pub semantic_candidates: usize,

    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar_api_key: Option<String>,

    /// Query PubMed after Semantic Scholar when nothing else was found
    #[serde(default)]
    pub pubmed_enabled: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            crossref_rows: default_crossref_rows(),
            crossref_mailto: None,
            semantic_candidates: default_semantic_candidates(),
            semantic_scholar_api_key: None,
            pubmed_enabled: false,
        }
    }
}

fn default_crossref_rows() -> usize {
    5
}

fn default_semantic_candidates() -> usize {
    10
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` (default) or `json`
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Fill API keys from their conventional environment variables when not configured
    fn apply_env_fallbacks(mut self) -> Self {
        if self.sources.semantic_scholar_api_key.is_none() {
            self.sources.semantic_scholar_api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok();
        }
        if self.sources.crossref_mailto.is_none() {
            self.sources.crossref_mailto = std::env::var("CROSSREF_MAILTO").ok();
        }
        self
    }
}

/// Load configuration from defaults, an optional file, and the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder =
        config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    Ok(config.apply_env_fallbacks())
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("scholar-digest").join("config.toml"))
        .filter(|path| path.is_file())
}
