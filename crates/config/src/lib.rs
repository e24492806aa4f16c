//! Configuration loading, validation, and management for goalchain.
//!
//! Loads configuration from `~/.goalchain/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.goalchain/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Retry and backoff policy of the execution engine
    #[serde(default)]
    pub engine: EngineConfig,

    /// Planner behavior switches
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Evaluator weighting constants
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Endpoints and credentials of the data-fetching agents
    #[serde(default)]
    pub agents: AgentsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Total attempts per step, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_max_backoff_ms() -> u64 {
    8_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Drop Weather from plans that have no launch to check the weather for.
    #[serde(default = "default_true")]
    pub weather_requires_launch: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            weather_requires_launch: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points subtracted per failed step
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: f64,

    /// Points added when the Summarize step succeeded
    #[serde(default = "default_summarize_bonus")]
    pub summarize_bonus: f64,

    /// Minimum score (0–100) for a goal to count as satisfied
    #[serde(default = "default_satisfaction_threshold")]
    pub satisfaction_threshold: f64,
}

fn default_failure_penalty() -> f64 {
    10.0
}
fn default_summarize_bonus() -> f64 {
    10.0
}
fn default_satisfaction_threshold() -> f64 {
    70.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            failure_penalty: default_failure_penalty(),
            summarize_bonus: default_summarize_bonus(),
            satisfaction_threshold: default_satisfaction_threshold(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_spacex_api_url")]
    pub spacex_api_url: String,

    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    #[serde(default = "default_news_api_url")]
    pub news_api_url: String,

    #[serde(default = "default_crypto_api_url")]
    pub crypto_api_url: String,

    /// OpenWeatherMap key. Without it the weather agent serves mock data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather_api_key: Option<String>,

    /// NewsAPI key. Without it the news agent serves canned articles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_api_key: Option<String>,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Location used by the weather agent when no launchpad is known.
    /// Unset or blank means the weather step fails with a missing dependency.
    #[serde(default = "default_fallback_location", skip_serializing_if = "Option::is_none")]
    pub fallback_location: Option<String>,
}

fn default_spacex_api_url() -> String {
    "https://api.spacexdata.com/v4".into()
}
fn default_weather_api_url() -> String {
    "https://api.openweathermap.org/data/2.5".into()
}
fn default_news_api_url() -> String {
    "https://newsapi.org/v2".into()
}
fn default_crypto_api_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_fallback_location() -> Option<String> {
    Some("Cape Canaveral".into())
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            spacex_api_url: default_spacex_api_url(),
            weather_api_url: default_weather_api_url(),
            news_api_url: default_news_api_url(),
            crypto_api_url: default_crypto_api_url(),
            openweather_api_key: None,
            news_api_key: None,
            http_timeout_secs: default_http_timeout_secs(),
            fallback_location: default_fallback_location(),
        }
    }
}

impl AgentsConfig {
    /// Treat blank optional strings as unset.
    fn normalize(&mut self) {
        for value in [
            &mut self.openweather_api_key,
            &mut self.news_api_key,
            &mut self.fallback_location,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AgentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentsConfig")
            .field("spacex_api_url", &self.spacex_api_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("news_api_url", &self.news_api_url)
            .field("crypto_api_url", &self.crypto_api_url)
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("news_api_key", &redact(&self.news_api_key))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("fallback_location", &self.fallback_location)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.goalchain/config.toml).
    ///
    /// Environment variables override the file:
    /// - `OPENWEATHER_API_KEY`
    /// - `NEWS_API_KEY`
    /// - `GOALCHAIN_MAX_ATTEMPTS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
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

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.agents.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            self.agents.openweather_api_key = Some(key);
        }

        if let Some(key) = lookup("NEWS_API_KEY") {
            self.agents.news_api_key = Some(key);
        }

        if let Some(raw) = lookup("GOALCHAIN_MAX_ATTEMPTS") {
            self.engine.max_attempts = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "GOALCHAIN_MAX_ATTEMPTS must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        self.agents.normalize();
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".goalchain")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_attempts must be at least 1".into(),
            ));
        }

        if self.engine.backoff_multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "engine.backoff_multiplier must be >= 1.0".into(),
            ));
        }

        if self.scoring.failure_penalty < 0.0 || self.scoring.summarize_bonus < 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring.failure_penalty and scoring.summarize_bonus must be >= 0".into(),
            ));
        }

        if !(0.0..=100.0).contains(&self.scoring.satisfaction_threshold) {
            return Err(ConfigError::ValidationError(
                "scoring.satisfaction_threshold must be between 0 and 100".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
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

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
