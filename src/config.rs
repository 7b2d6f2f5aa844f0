//! TOML configuration plus environment-provided secrets.
//!
//! Non-secret settings live in a TOML file (default
//! `./config/sentiment.toml`). Credentials are only ever read from the
//! environment:
//!
//! | Variable | Purpose |
//! |----------|---------|
//! | `SLACK_BOT_TOKEN` | Bearer token for Slack Web API calls |
//! | `SLACK_SIGNING_SECRET` | Enables request signature verification |
//! | `GEMINI_API_KEY` | Enables the oracle fallback scorer |
//! | `GEMINI_MODEL` | Overrides `oracle.model` |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub datasets: DatasetsConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
    /// Maximum number of thread messages fetched per analysis.
    #[serde(default = "default_thread_page_size")]
    pub thread_page_size: u32,
    #[serde(default = "default_slack_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_slack_api_base(),
            thread_page_size: default_thread_page_size(),
            timeout_secs: default_slack_timeout_secs(),
        }
    }
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}
fn default_thread_page_size() -> u32 {
    50
}
fn default_slack_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model tried first by the cascade.
    #[serde(default = "default_model")]
    pub model: String,
    /// Models tried after `model`, in order.
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    #[serde(default = "default_oracle_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries per model on 429/5xx before the cascade moves on.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            fallback_models: default_fallback_models(),
            api_base: default_oracle_api_base(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_fallback_models() -> Vec<String> {
    ["gemini-2.5-flash", "gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}
fn default_oracle_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl OracleConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// `model` followed by `fallback_models`, as configured. The cascade
    /// drops blanks and repeats.
    pub fn candidate_models(&self) -> Vec<String> {
        std::iter::once(&self.model)
            .chain(self.fallback_models.iter())
            .cloned()
            .collect()
    }
}

/// Replacement sentiment datasets read at startup instead of the bundled
/// ones.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatasetsConfig {
    /// AFINN-format word list, one `word<TAB>score` per line.
    pub lexicon_path: Option<PathBuf>,
    /// Emoji Sentiment Ranking JSON (`sequence` + `score` entries).
    pub emoji_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
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

/// Credentials taken from the environment. Blank values count as unset.
#[derive(Clone, Default)]
pub struct Secrets {
    pub slack_bot_token: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("slack_bot_token", &self.slack_bot_token.is_some())
            .field("slack_signing_secret", &self.slack_signing_secret.is_some())
            .field("gemini_api_key", &self.gemini_api_key.is_some())
            .finish()
    }
}

impl Config {
    /// Defaults only; used when no configuration file is available.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Fill secrets and overrides from an environment lookup function.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.secrets = Secrets {
            slack_bot_token: non_blank("SLACK_BOT_TOKEN"),
            slack_signing_secret: non_blank("SLACK_SIGNING_SECRET"),
            gemini_api_key: non_blank("GEMINI_API_KEY"),
        };
        if let Some(model) = non_blank("GEMINI_MODEL") {
            self.oracle.model = model;
        }
        self
    }

    /// Whether the oracle cascade can run at all.
    pub fn oracle_active(&self) -> bool {
        self.oracle.is_enabled() && self.secrets.gemini_api_key.is_some()
    }
}

/// Read, parse, and validate a configuration file, then apply the
/// process environment.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?.apply_env(|key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Parse configuration TOML without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if !(1..=1000).contains(&config.slack.thread_page_size) {
        anyhow::bail!("slack.thread_page_size must be in [1, 1000]");
    }

    match config.oracle.provider.as_str() {
        "gemini" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown oracle provider: '{}'. Must be gemini or disabled.",
            other
        ),
    }

    if config.oracle.is_enabled() && config.oracle.model.trim().is_empty() {
        anyhow::bail!(
            "oracle.model must be specified when provider is '{}'",
            config.oracle.provider
        );
    }

    Ok(())
}
