//! Session configuration.
//!
//! Defaults match the classic debate format: five turns per side, fifteen
//! challenges, five rebuttals, ninety seconds per turn. Values can come from
//! a TOML file and be overridden by `DIALOGUE_*` environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Quotas and timing for one dialogue session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Turns each actor may take.
    pub max_turns: u32,
    /// Challenges each actor may issue.
    pub challenges: u32,
    /// Rebuttals each actor may submit.
    pub rebuttals: u32,
    /// Seconds before an idle turn is skipped.
    pub turn_timeout_secs: u64,
    /// Period of the timer tick in milliseconds.
    pub tick_millis: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            challenges: 15,
            rebuttals: 5,
            turn_timeout_secs: 90,
            tick_millis: 1000,
        }
    }
}

impl DialogueConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `DIALOGUE_*` overrides from `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    key: key.to_string(),
                    value,
                })
        }

        if let Some(v) = lookup("DIALOGUE_MAX_TURNS") {
            self.max_turns = parse("DIALOGUE_MAX_TURNS", v)?;
        }
        if let Some(v) = lookup("DIALOGUE_CHALLENGES") {
            self.challenges = parse("DIALOGUE_CHALLENGES", v)?;
        }
        if let Some(v) = lookup("DIALOGUE_REBUTTALS") {
            self.rebuttals = parse("DIALOGUE_REBUTTALS", v)?;
        }
        if let Some(v) = lookup("DIALOGUE_TURN_TIMEOUT_SECS") {
            self.turn_timeout_secs = parse("DIALOGUE_TURN_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("DIALOGUE_TICK_MILLIS") {
            self.tick_millis = parse("DIALOGUE_TICK_MILLIS", v)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == 0 {
            return Err(ConfigError::Invalid("max_turns must be at least 1".into()));
        }
        if self.turn_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "turn_timeout_secs must be at least 1".into(),
            ));
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid("tick_millis must be at least 1".into()));
        }
        Ok(())
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// Where the HTTP content store lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Base URL of the argument backend, without a trailing `/api`.
    pub base_url: String,
    /// Per-request timeout in seconds (headers and body).
    pub timeout_secs: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DIALOGUE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            timeout_secs: 10,
        }
    }
}

impl HttpStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
