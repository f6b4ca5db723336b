//! Configuration loading, validation, and credentials for skiff.
//!
//! Loads `~/.skiff/config.toml` (every field has a default), then applies
//! environment overrides. The API key comes from, in order:
//! `SKIFF_API_KEY`, `OPENAI_API_KEY`, the config file, and finally a
//! `vault.json` in `./.skiff/` or `~/.skiff/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure. Maps to `~/.skiff/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model used for vector store embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Upper bound on LLM round-trips per chat turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Where chat sessions are persisted. Defaults to `~/.skiff`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpConfig,

    /// Per-person, per-day USD rates used by the trip budget calculator
    #[serde(default)]
    pub budget: RateTable,

    #[serde(default)]
    pub books: BooksConfig,

    #[serde(default)]
    pub crypto: CryptoConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_max_tool_iterations() -> u32 {
    10
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("embedding_model", &self.embedding_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("data_dir", &self.data_dir)
            .field("http", &self.http)
            .field("budget", &self.budget)
            .field("books", &self.books)
            .field("crypto", &self.crypto)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("skiff/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Rates for one cost category across the three budget tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRates {
    pub budget: u64,
    pub mid_range: u64,
    pub luxury: u64,
}

/// USD per person per day. Accommodation and meals vary by tier; the
/// remaining categories are flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default = "default_accommodation")]
    pub accommodation: TierRates,

    #[serde(default = "default_meals")]
    pub meals: TierRates,

    #[serde(default = "default_activities")]
    pub activities: u64,

    #[serde(default = "default_local_transport")]
    pub local_transport: u64,

    #[serde(default = "default_miscellaneous")]
    pub miscellaneous: u64,
}

fn default_accommodation() -> TierRates {
    TierRates {
        budget: 50,
        mid_range: 120,
        luxury: 300,
    }
}
fn default_meals() -> TierRates {
    TierRates {
        budget: 35,
        mid_range: 75,
        luxury: 150,
    }
}
fn default_activities() -> u64 {
    50
}
fn default_local_transport() -> u64 {
    20
}
fn default_miscellaneous() -> u64 {
    30
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            accommodation: default_accommodation(),
            meals: default_meals(),
            activities: default_activities(),
            local_transport: default_local_transport(),
            miscellaneous: default_miscellaneous(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksConfig {
    /// Open Library search endpoint
    #[serde(default = "default_books_url")]
    pub search_url: String,

    #[serde(default = "default_books_top_k")]
    pub top_k: usize,
}

fn default_books_url() -> String {
    "https://openlibrary.org/search.json".into()
}
fn default_books_top_k() -> usize {
    5
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            search_url: default_books_url(),
            top_k: default_books_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// CoinGecko API root
    #[serde(default = "default_crypto_url")]
    pub base_url: String,

    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
}

fn default_crypto_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}
fn default_vs_currency() -> String {
    "usd".into()
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            base_url: default_crypto_url(),
            vs_currency: default_vs_currency(),
        }
    }
}

/// Shape of `vault.json`. Either a provider-keyed entry or a bare key.
#[derive(Debug, Default, Deserialize)]
struct Vault {
    #[serde(default)]
    openai: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

impl AppConfig {
    /// Load from `~/.skiff/config.toml` and apply env and vault overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;

        let file_key = config.api_key.take();
        config.api_key = first_key([
            std::env::var("SKIFF_API_KEY").ok(),
            std::env::var("OPENAI_API_KEY").ok(),
            file_key,
        ]);

        if config.api_key.is_none() {
            let cwd = std::env::current_dir().unwrap_or_default();
            let candidates = [Self::vault_path(&cwd), Self::config_dir().join("vault.json")];
            config.api_key = Self::api_key_from_vaults(&candidates)?;
        }

        if let Some(model) = first_key([std::env::var("SKIFF_MODEL").ok()]) {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// `~/.skiff`
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skiff")
    }

    /// Project-local vault: `<dir>/.skiff/vault.json`
    pub fn vault_path(dir: &Path) -> PathBuf {
        dir.join(".skiff").join("vault.json")
    }

    /// Directory holding persisted chat sessions.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(Self::config_dir)
            .join("sessions")
    }

    /// First API key found in the given vault files. Missing files are skipped.
    fn api_key_from_vaults(paths: &[PathBuf]) -> Result<Option<String>, ConfigError> {
        for path in paths {
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let vault: Vault = serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if let Some(key) = vault.openai.or(vault.api_key).filter(|k| !k.is_empty()) {
                tracing::debug!(vault = %path.display(), "API key loaded from vault");
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_tool_iterations must be > 0".into(),
            ));
        }

        for (name, rates) in [
            ("accommodation", &self.budget.accommodation),
            ("meals", &self.budget.meals),
        ] {
            if !(rates.budget < rates.mid_range && rates.mid_range < rates.luxury) {
                return Err(ConfigError::ValidationError(format!(
                    "budget.{name} rates must increase from budget to mid_range to luxury"
                )));
            }
        }

        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// First candidate that is set and not blank, trimmed.
fn first_key<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            default_model: default_model(),
            embedding_model: default_embedding_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            max_tool_iterations: default_max_tool_iterations(),
            data_dir: None,
            http: HttpConfig::default(),
            budget: RateTable::default(),
            books: BooksConfig::default(),
            crypto: CryptoConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
