//! Configuration management for sitesearch using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::TimestampPolicy;
use crate::rate_limit::RateLimitConfig;
use crate::repository::DbContext;
use crate::search::IndexNames;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "sitesearch.db";

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Cache backend (None = in-memory, "redis://..." = Redis).
    pub cache_backend: Option<String>,
    /// Upper bound for a single cache round trip, in seconds.
    pub cache_timeout_secs: u64,
    /// Elasticsearch base URL.
    pub elasticsearch_url: String,
    /// Search request timeout in seconds.
    pub search_timeout_secs: u64,
    /// Index names.
    pub indices: IndexNames,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Requests per IP per minute.
    pub rate_limit_per_minute: u32,
    /// Block duration once the limit is hit, in seconds.
    pub rate_limit_block_secs: u64,
    /// Timestamp tolerance for token requests.
    pub token_timestamp_policy: TimestampPolicy,
    /// Timestamp tolerance for signed search requests.
    pub search_timestamp_policy: TimestampPolicy,
    /// Reject API requests without a browser-like User-Agent and Referer.
    pub check_headers: bool,
    /// Minutes between feedback submissions from one IP.
    pub feedback_cooldown_mins: u64,
    /// Minutes between bad-URL reports from one IP.
    pub bad_url_cooldown_mins: u64,
    /// HTTP bind address.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesearch");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            cache_backend: None,
            cache_timeout_secs: 3,
            elasticsearch_url: "http://127.0.0.1:9200".to_string(),
            search_timeout_secs: 30,
            indices: IndexNames::default(),
            token_ttl_secs: 1800,
            rate_limit_per_minute: 40,
            rate_limit_block_secs: 300,
            token_timestamp_policy: TimestampPolicy::Standard,
            search_timestamp_policy: TimestampPolicy::Standard,
            check_headers: true,
            feedback_cooldown_mins: 30,
            bad_url_cooldown_mins: 5,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Full path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        if self.database_url.is_none() {
            std::fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Create a database context for these settings.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(self.rate_limit_per_minute, self.rate_limit_block_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn feedback_cooldown(&self) -> Duration {
        Duration::from_secs(self.feedback_cooldown_mins * 60)
    }

    pub fn bad_url_cooldown(&self) -> Duration {
        Duration::from_secs(self.bad_url_cooldown_mins * 60)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Some(url) = env_value("DATABASE_URL") {
            tracing::debug!("Using DATABASE_URL from environment: {}", url);
            self.database_url = Some(url);
        }
        if let Some(url) = env_value("REDIS_URL") {
            tracing::debug!("Using REDIS_URL from environment");
            self.cache_backend = Some(url);
        }
        if let Some(url) = env_value("ELASTICSEARCH_URL") {
            tracing::debug!("Using ELASTICSEARCH_URL from environment: {}", url);
            self.elasticsearch_url = url;
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn apply_policy(raw: &str, target: &mut TimestampPolicy) {
    match raw.parse::<TimestampPolicy>() {
        Ok(p) => *target = p,
        Err(e) => tracing::warn!("{}; keeping '{}'", e, target),
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Cache backend: "memory" or a redis:// URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_block_secs: Option<u64>,
    /// "standard" (30 minutes) or "strict" (10 seconds), for every endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_policy: Option<String>,
    /// Overrides `timestamp_policy` for token requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_timestamp_policy: Option<String>,
    /// Overrides `timestamp_policy` for signed search requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_timestamp_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_cooldown_mins: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_url_cooldown_mins: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Discovers sitesearch config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("sitesearch").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Parses JSON, TOML or YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            if database.contains("://") || database.starts_with("sqlite:") {
                settings.database_url = Some(database.clone());
            } else {
                settings.database_filename = database.clone();
            }
        }
        match self.cache_backend.as_deref() {
            Some("memory") => settings.cache_backend = None,
            Some(url) => settings.cache_backend = Some(url.to_string()),
            None => {}
        }
        if let Some(secs) = self.cache_timeout_secs {
            settings.cache_timeout_secs = secs;
        }
        if let Some(ref url) = self.elasticsearch_url {
            settings.elasticsearch_url = url.clone();
        }
        if let Some(secs) = self.search_timeout_secs {
            settings.search_timeout_secs = secs;
        }
        if let Some(ref index) = self.content_index {
            settings.indices.content = index.clone();
        }
        if let Some(ref index) = self.archive_index {
            settings.indices.archive = index.clone();
        }
        if let Some(ref index) = self.suggest_index {
            settings.indices.suggest = index.clone();
        }
        if let Some(ref index) = self.related_index {
            settings.indices.related = index.clone();
        }
        if let Some(secs) = self.token_ttl_secs {
            settings.token_ttl_secs = secs;
        }
        if let Some(limit) = self.rate_limit_per_minute {
            settings.rate_limit_per_minute = limit;
        }
        if let Some(secs) = self.rate_limit_block_secs {
            settings.rate_limit_block_secs = secs;
        }
        if let Some(ref policy) = self.timestamp_policy {
            apply_policy(policy, &mut settings.token_timestamp_policy);
            apply_policy(policy, &mut settings.search_timestamp_policy);
        }
        if let Some(ref policy) = self.token_timestamp_policy {
            apply_policy(policy, &mut settings.token_timestamp_policy);
        }
        if let Some(ref policy) = self.search_timestamp_policy {
            apply_policy(policy, &mut settings.search_timestamp_policy);
        }
        if let Some(check) = self.check_headers {
            settings.check_headers = check;
        }
        if let Some(mins) = self.feedback_cooldown_mins {
            settings.feedback_cooldown_mins = mins;
        }
        if let Some(mins) = self.bad_url_cooldown_mins {
            settings.bad_url_cooldown_mins = mins;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// Load settings: config file (explicit path or discovered), then environment.
pub async fn load_settings(config_path: Option<&Path>) -> anyhow::Result<(Settings, Config)> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(anyhow::Error::msg)?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let base_dir = config
        .base_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env();

    Ok((settings, config))
}
