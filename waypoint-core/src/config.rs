//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/waypoint/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/waypoint/` (~/.config/waypoint/)
//! - State/Logs: `$XDG_STATE_HOME/waypoint/` (~/.local/state/waypoint/)
//!
//! Provider credentials may be given in the file or through the usual
//! environment variables (`GROQ_API_KEY`, `COHERE_API_KEY`, ...). A provider
//! without a credential is not configured and is never attempted.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Fallback engine behaviour
    #[serde(default)]
    pub companion: CompanionConfig,

    /// Per-provider credentials and overrides
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Analytics thresholds
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================
// Providers
// ============================================

/// Supported text-generation providers, in fixed priority order.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    HuggingFace,
    Cohere,
    DeepSeek,
    OpenAI,
}

impl ProviderKind {
    /// All providers in fixed priority order. Groq is the primary free tier.
    pub const PRIORITY: [ProviderKind; 5] = [
        ProviderKind::Groq,
        ProviderKind::HuggingFace,
        ProviderKind::Cohere,
        ProviderKind::DeepSeek,
        ProviderKind::OpenAI,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Cohere => "cohere",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Returns the default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::HuggingFace => {
                "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium"
            }
            ProviderKind::Cohere => "https://api.cohere.ai/v1",
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.1-8b-instant",
            ProviderKind::HuggingFace => "microsoft/DialoGPT-medium",
            ProviderKind::Cohere => "command",
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variable consulted when the config has no api_key
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::HuggingFace => "HUGGINGFACE_API_KEY",
            ProviderKind::Cohere => "COHERE_API_KEY",
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "huggingface" => Ok(ProviderKind::HuggingFace),
            "cohere" => Ok(ProviderKind::Cohere),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "openai" => Ok(ProviderKind::OpenAI),
            _ => Err(format!("unknown provider: {}", s)),
        }
    }
}

/// Settings for one provider. Every field is optional.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// API key (can also use env var)
    pub api_key: Option<String>,
    /// Model to use (optional, uses default for provider)
    pub model: Option<String>,
    /// API endpoint (optional, uses default for provider)
    pub endpoint: Option<String>,
    /// Per-attempt timeout override
    pub timeout_secs: Option<u64>,
}

/// Provider table, one optional entry per kind.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub groq: ProviderConfig,
    #[serde(default)]
    pub huggingface: ProviderConfig,
    #[serde(default)]
    pub cohere: ProviderConfig,
    #[serde(default)]
    pub deepseek: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Groq => &self.groq,
            ProviderKind::HuggingFace => &self.huggingface,
            ProviderKind::Cohere => &self.cohere,
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::OpenAI => &self.openai,
        }
    }
}

/// Fully-resolved provider settings, produced only for configured providers.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

// ============================================
// Companion
// ============================================

/// How the candidate provider list is ordered.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    /// Fixed priority order
    #[default]
    Fixed,
    /// Historical success rate, best first
    SuccessRate,
    /// `companion.preferred` first, the rest in fixed order
    Preferred,
}

/// Fallback engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CompanionConfig {
    /// Ordering policy
    #[serde(default)]
    pub policy: PolicyName,

    /// Provider tried first under the `preferred` policy
    #[serde(default)]
    pub preferred: Option<ProviderKind>,

    /// Default per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature sent to providers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Language the companion answers in
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyName::default(),
            preferred: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            language: default_language(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_language() -> String {
    "English".to_string()
}

// ============================================
// Analytics
// ============================================

/// Analytics thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Cards at or above this priority count as high priority
    #[serde(default = "default_high_priority_threshold")]
    pub high_priority_threshold: u8,

    /// More high-priority active cards than this triggers "reprioritize"
    #[serde(default = "default_high_priority_limit")]
    pub high_priority_limit: usize,

    /// Maximum recommendations surfaced
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Days without an action before `weekly_review` fires
    #[serde(default = "default_weekly_review_days")]
    pub weekly_review_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            high_priority_threshold: default_high_priority_threshold(),
            high_priority_limit: default_high_priority_limit(),
            max_recommendations: default_max_recommendations(),
            weekly_review_days: default_weekly_review_days(),
        }
    }
}

fn default_high_priority_threshold() -> u8 {
    4
}

fn default_high_priority_limit() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    3
}

fn default_weekly_review_days() -> i64 {
    7
}

// ============================================
// Logging
// ============================================

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.companion.policy == PolicyName::Preferred && self.companion.preferred.is_none() {
            return Err(Error::Config(
                "companion.preferred is required when companion.policy = \"preferred\""
                    .to_string(),
            ));
        }
        if self.companion.timeout_secs == 0 {
            return Err(Error::Config(
                "companion.timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.companion.temperature) {
            return Err(Error::Config(
                "companion.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve configured providers in fixed priority order.
    ///
    /// `lookup_env` is consulted for credentials the file does not carry;
    /// pass `|name| std::env::var(name).ok()` for the process environment.
    pub fn resolve_providers<F>(&self, lookup_env: F) -> Vec<ResolvedProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        ProviderKind::PRIORITY
            .iter()
            .filter_map(|&kind| {
                let entry = self.providers.get(kind);
                let api_key = entry
                    .api_key
                    .clone()
                    .or_else(|| lookup_env(kind.env_var()))
                    .filter(|key| !key.trim().is_empty())?;
                Some(ResolvedProvider {
                    kind,
                    api_key,
                    model: entry
                        .model
                        .clone()
                        .unwrap_or_else(|| kind.default_model().to_string()),
                    endpoint: entry
                        .endpoint
                        .clone()
                        .unwrap_or_else(|| kind.default_endpoint().to_string()),
                    timeout_secs: entry
                        .timeout_secs
                        .unwrap_or(self.companion.timeout_secs)
                        .max(1),
                })
            })
            .collect()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/waypoint/config.toml` (~/.config/waypoint/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("waypoint").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/waypoint/` (~/.local/state/waypoint/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("waypoint")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/waypoint/waypoint.log` (~/.local/state/waypoint/waypoint.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("waypoint.log")
    }
}
