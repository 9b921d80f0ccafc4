// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;

/// Raised when the environment cannot produce a usable `Config`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the external language-model API.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Without a key every completion fails and callers fall back to their canned replies.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub openai: OpenAiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://gym_coach.db?mode=rwc".to_string());

        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let jwt_expiration = parse_var("JWT_EXPIRATION", "1800")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty()),
            api_base: env::var("OPENAI_API_BASE").unwrap_or(defaults.api_base),
            model: env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            timeout_secs: parse_var("OPENAI_TIMEOUT_SECS", "60")?,
        };

        Ok(Self {
            database_url,
            bind_address,
            jwt_secret,
            jwt_expiration,
            rust_log,
            openai,
        })
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_api_key() {
        let openai = OpenAiConfig {
            api_key: Some("sk-very-secret".to_string()),
            ..OpenAiConfig::default()
        };

        let rendered = format!("{:?}", openai);
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
