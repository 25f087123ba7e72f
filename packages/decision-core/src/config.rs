use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_DISTRICT: &str = "Andhra Pradesh";

/// Decision service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Upper bound on any single oracle call
    pub oracle_timeout: Duration,
    pub chat_model: String,
    pub embedding_model: String,
    /// Absent key means offline mode (fallbacks only)
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// Keep only the top N matches
    pub match_result_limit: Option<usize>,
    /// Substituted for [District] when the caller has none
    pub default_district: String,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            match_result_limit: None,
            default_district: DEFAULT_DISTRICT.to_string(),
        }
    }
}

impl DecisionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        let oracle_timeout = match env::var("ORACLE_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(
                raw.parse()
                    .context("ORACLE_TIMEOUT_MS must be a valid number")?,
            ),
            Err(_) => defaults.oracle_timeout,
        };

        let match_result_limit = match env::var("MATCH_RESULT_LIMIT") {
            Ok(raw) => Some(
                raw.parse()
                    .context("MATCH_RESULT_LIMIT must be a valid number")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            oracle_timeout,
            chat_model: env::var("ORACLE_CHAT_MODEL").unwrap_or(defaults.chat_model),
            embedding_model: env::var("ORACLE_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            match_result_limit,
            default_district: env::var("DEFAULT_DISTRICT").unwrap_or(defaults.default_district),
        })
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_match_result_limit(mut self, limit: usize) -> Self {
        self.match_result_limit = Some(limit);
        self
    }

    pub fn with_default_district(mut self, district: impl Into<String>) -> Self {
        self.default_district = district.into();
        self
    }

    pub fn is_offline(&self) -> bool {
        self.openai_api_key.is_none()
    }
}
