//! OpenAI implementation of the `Oracle` trait.
//!
//! Chat calls use the `json_schema` response format with schemas derived
//! from the oracle payload types. Embeddings use one batched request.
//!
//! # Example
//!
//! ```rust,ignore
//! use decision_core::ai::OpenAIOracle;
//!
//! let oracle = OpenAIOracle::new("sk-...").with_model("gpt-4o");
//! let engine = DecisionEngine::new(oracle, DecisionConfig::default());
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::schema::StructuredOutput;
use crate::config::DecisionConfig;
use crate::error::{DecisionError, OracleError, OracleResult};
use crate::oracle::{Oracle, OracleClassification, OracleEmail, OracleScore, OutreachRequest};
use crate::prompts;
use crate::types::entity::EntityAttributes;

/// Characters of input sent to the embedding endpoint.
pub const MAX_EMBEDDING_CHARS: usize = 8000;

/// OpenAI-backed oracle.
#[derive(Clone)]
pub struct OpenAIOracle {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
}

impl OpenAIOracle {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Build from config. Fails when no API key is configured.
    pub fn from_config(config: &DecisionConfig) -> Result<Self, DecisionError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| DecisionError::Config("OPENAI_API_KEY not set".into()))?;

        info!(
            model = %config.chat_model,
            embedding_model = %config.embedding_model,
            prompt_version = %prompts::prompt_version_hash(),
            "OpenAI oracle configured"
        );

        Ok(Self::new(api_key)
            .with_model(&config.chat_model)
            .with_embedding_model(&config.embedding_model)
            .with_base_url(&config.openai_base_url))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Structured chat completion decoded into `T`.
    async fn structured<T: StructuredOutput>(&self, user: &str, temperature: f32) -> OracleResult<T> {
        let request = StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: T::type_name(),
                    strict: true,
                    schema: T::openai_schema(),
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat request failed");
                OracleError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, error = %error_text, "OpenAI chat error");
            return Err(OracleError::Api(format!("{}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("no choices in response".into()))?;

        debug!(type_name = %T::type_name(), content_len = content.len(), "Structured response received");

        serde_json::from_str(&content).map_err(|e| {
            OracleError::MalformedResponse(format!("failed to deserialize {}: {}", T::type_name(), e))
        })
    }

    async fn embeddings(&self, texts: &[&str]) -> OracleResult<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.iter().map(|t| truncate_chars(t, MAX_EMBEDDING_CHARS)).collect(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Embedding request failed");
                OracleError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, error = %error_text, "OpenAI embedding error");
            return Err(OracleError::Api(format!("{}: {}", status, error_text)));
        }

        let mut embed_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        if embed_response.data.len() != texts.len() {
            return Err(OracleError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embed_response.data.len()
            )));
        }

        embed_response.data.sort_by_key(|d| d.index);
        Ok(embed_response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Oracle for OpenAIOracle {
    async fn classify(&self, description: &str) -> OracleResult<OracleClassification> {
        self.structured(&prompts::format_classify_prompt(description), 0.1)
            .await
    }

    async fn score_relevance(&self, attributes: &EntityAttributes) -> OracleResult<OracleScore> {
        self.structured(&prompts::format_score_prompt(attributes), 0.2)
            .await
    }

    async fn embed(&self, text: &str) -> OracleResult<Vec<f32>> {
        self.embeddings(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::MalformedResponse("no embedding returned".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> OracleResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embeddings(texts).await
    }

    async fn generate_outreach(&self, request: &OutreachRequest) -> OracleResult<OracleEmail> {
        let prompt = prompts::format_outreach_prompt(
            &request.organization_name,
            request.category,
            &request.district,
        );
        self.structured(&prompt, 0.7).await
    }
}

/// First `max` characters of `text`, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// =============================================================================
// Request/Response types
// =============================================================================

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "ప్రసూతి".repeat(3000);
        let truncated = truncate_chars(&text, MAX_EMBEDDING_CHARS);
        assert_eq!(truncated.chars().count(), MAX_EMBEDDING_CHARS);
    }

    #[test]
    fn from_config_requires_key() {
        let offline = DecisionConfig::default();
        assert!(matches!(OpenAIOracle::from_config(&offline), Err(DecisionError::Config(_))));

        let online = DecisionConfig::default().with_api_key("sk-test");
        let oracle = OpenAIOracle::from_config(&online).unwrap();
        assert_eq!(oracle.model(), "gpt-4o");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let oracle = OpenAIOracle::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(oracle.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn embedding_response_parses() {
        let parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.5]},{"index":0,"embedding":[0.25]}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].index, 1);
    }
}
