use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Top-level application configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    pub database_url: String,
    pub db_pool_max_size: u32,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
    pub admin_username: String,
    pub admin_password: String,
    /// Idle lifetime of a session in minutes
    pub session_ttl_minutes: i64,
    /// Cron expression for the live quiz expiry sweep
    pub quiz_expiry_cron: String,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Build configuration from environment variables (after `.env` is loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8000"),
            database_url,
            db_pool_max_size: env_parse("DB_POOL_MAX_SIZE", 10)?,
            run_migrations: env_parse("RUN_MIGRATIONS", true)?,
            admin_username: env_or("ADMIN_USERNAME", "root"),
            admin_password: env_or("ADMIN_PASSWORD", "root"),
            session_ttl_minutes: env_parse("SESSION_TTL_MINUTES", 720)?,
            quiz_expiry_cron: env_or("QUIZ_EXPIRY_CRON", "0 * * * * *"),
            llm: LlmConfig::from_env()?,
        })
    }
}

/// Hosted LLM (OpenAI-compatible chat completions) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API root, `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; requests are sent unauthenticated when absent
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Models tried in order until one answers
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let models = std::env::var("LLM_MODELS")
            .ok()
            .map(|raw| parse_list(&raw))
            .filter(|models| !models.is_empty())
            .unwrap_or_else(default_models);

        Ok(Self {
            base_url: env_or("LLM_BASE_URL", &default_base_url()),
            api_key: std::env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            models,
            timeout_secs: env_parse("LLM_TIMEOUT_SECS", default_timeout())?,
            max_tokens: env_parse("LLM_MAX_TOKENS", default_max_tokens())?,
            temperature: env_parse("LLM_TEMPERATURE", default_temperature())?,
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            models: default_models(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_models() -> Vec<String> {
    [
        "llama-3.1-8b-instant",
        "llama-3.1-70b-versatile",
        "gemma2-9b-it",
        "llama3-70b-8192",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

fn default_timeout() -> u64 {
    20
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional env var, falling back to `default` when unset
fn env_parse<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_value(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// Comma separated list, blanks dropped
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.models.len(), 4);
        assert_eq!(config.models[0], "llama-3.1-8b-instant");
        assert_eq!(config.timeout_secs, 20);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_llm_config_deserialize_with_defaults() {
        let config: LlmConfig = serde_json::from_str(r#"{"models":["m1"]}"#).unwrap();
        assert_eq!(config.models, vec!["m1".to_string()]);
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u32>("X", " 12 ").unwrap(), 12);
        assert!(parse_value::<bool>("X", "true").unwrap());
        assert!(matches!(
            parse_value::<u32>("X", "twelve"),
            Err(ConfigError::Invalid { name: "X", .. })
        ));
    }
}
