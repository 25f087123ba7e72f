//! Oracle trait for the external AI capability.
//!
//! The oracle abstracts the LLM and embedding calls the services need:
//! - Classification of an organization description
//! - Relevance scoring of an entity
//! - Embeddings for semantic matching
//! - Outreach email generation
//!
//! Implementations return raw oracle payloads. Services validate them and
//! treat anything unusable as `OracleError::MalformedResponse`.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{OracleError, OracleResult};
use crate::types::category::Category;
use crate::types::entity::EntityAttributes;

/// Oracle trait for AI operations.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Classify a description into the taxonomy.
    async fn classify(&self, description: &str) -> OracleResult<OracleClassification>;

    /// Score an entity's relevance for the maternal health pilot.
    async fn score_relevance(&self, attributes: &EntityAttributes) -> OracleResult<OracleScore>;

    /// Generate an embedding for text.
    async fn embed(&self, text: &str) -> OracleResult<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[&str]) -> OracleResult<Vec<Vec<f32>>> {
        // Default implementation calls embed sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Write a partnership outreach email.
    async fn generate_outreach(&self, request: &OutreachRequest) -> OracleResult<OracleEmail>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn classify(&self, description: &str) -> OracleResult<OracleClassification> {
        (**self).classify(description).await
    }

    async fn score_relevance(&self, attributes: &EntityAttributes) -> OracleResult<OracleScore> {
        (**self).score_relevance(attributes).await
    }

    async fn embed(&self, text: &str) -> OracleResult<Vec<f32>> {
        (**self).embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> OracleResult<Vec<Vec<f32>>> {
        (**self).embed_batch(texts).await
    }

    async fn generate_outreach(&self, request: &OutreachRequest) -> OracleResult<OracleEmail> {
        (**self).generate_outreach(request).await
    }
}

/// Raw classification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OracleClassification {
    /// One of the category labels
    #[serde(rename = "type")]
    pub category: String,
    /// Integer 0-100
    pub confidence: i64,
    /// 2-3 sentence explanation
    pub reasoning: String,
}

impl OracleClassification {
    pub fn new(category: impl Into<String>, confidence: i64, reasoning: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// Check the payload against the taxonomy and confidence range, and
    /// require a non-blank reasoning.
    pub fn validate(self) -> OracleResult<(Category, u8, String)> {
        let category = Category::from_label(&self.category).ok_or_else(|| {
            OracleError::MalformedResponse(format!("unknown category '{}'", self.category))
        })?;
        let confidence = u8::try_from(self.confidence)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or_else(|| {
                OracleError::MalformedResponse(format!("confidence {} out of range", self.confidence))
            })?;
        if self.reasoning.trim().is_empty() {
            return Err(OracleError::MalformedResponse("classification without reasoning".into()));
        }
        Ok((category, confidence, self.reasoning))
    }
}

/// Raw relevance payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OracleScore {
    /// Integer 0-100
    pub score: i64,
    pub reasoning: Vec<String>,
}

impl OracleScore {
    pub fn validate(self) -> OracleResult<(u8, Vec<String>)> {
        let score = u8::try_from(self.score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| OracleError::MalformedResponse(format!("score {} out of range", self.score)))?;
        if self.reasoning.iter().all(|r| r.trim().is_empty()) {
            return Err(OracleError::MalformedResponse("score without reasoning".into()));
        }
        Ok((score, self.reasoning))
    }
}

/// Raw outreach email payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OracleEmail {
    pub subject: String,
    pub body: String,
}

impl OracleEmail {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn validate(self) -> OracleResult<Self> {
        if self.subject.trim().is_empty() || self.body.trim().is_empty() {
            return Err(OracleError::MalformedResponse("email missing subject or body".into()));
        }
        Ok(self)
    }
}

/// What the oracle needs to write an outreach email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachRequest {
    pub organization_name: String,
    pub category: Category,
    pub district: String,
}

/// Oracle that is never reachable.
///
/// Used when no API key is configured so every operation runs its
/// deterministic fallback.
#[derive(Debug, Clone, Default)]
pub struct UnavailableOracle;

#[async_trait]
impl Oracle for UnavailableOracle {
    async fn classify(&self, _description: &str) -> OracleResult<OracleClassification> {
        Err(OracleError::Network("oracle unavailable".into()))
    }

    async fn score_relevance(&self, _attributes: &EntityAttributes) -> OracleResult<OracleScore> {
        Err(OracleError::Network("oracle unavailable".into()))
    }

    async fn embed(&self, _text: &str) -> OracleResult<Vec<f32>> {
        Err(OracleError::Network("oracle unavailable".into()))
    }

    async fn generate_outreach(&self, _request: &OutreachRequest) -> OracleResult<OracleEmail> {
        Err(OracleError::Network("oracle unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_validation_accepts_known_label() {
        let (category, confidence, reasoning) =
            OracleClassification::new("Medical College", 91, "Teaching hospital").validate().unwrap();
        assert_eq!(category, Category::MedicalCollege);
        assert_eq!(confidence, 91);
        assert_eq!(reasoning, "Teaching hospital");
    }

    #[test]
    fn classification_validation_rejects_unknown_label() {
        let err = OracleClassification::new("Pharmacy", 80, "Dispensary").validate().unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse(_)));
    }

    #[test]
    fn classification_validation_rejects_out_of_range_confidence() {
        assert!(OracleClassification::new("NGO", 101, "Village trust").validate().is_err());
        assert!(OracleClassification::new("NGO", -1, "Village trust").validate().is_err());
    }

    #[test]
    fn classification_validation_rejects_blank_reasoning() {
        let err = OracleClassification::new("NGO", 80, "  ").validate().unwrap_err();
        assert!(matches!(err, OracleError::MalformedResponse(_)));
    }

    #[test]
    fn classification_deserializes_type_field() {
        let parsed: OracleClassification =
            serde_json::from_str(r#"{"type":"PHC","confidence":77,"reasoning":"Rural centre"}"#).unwrap();
        assert_eq!(parsed.category, "PHC");
    }

    #[test]
    fn score_validation() {
        let ok = OracleScore { score: 72, reasoning: vec!["Runs a labour room".into()] };
        assert_eq!(ok.validate().unwrap().0, 72);

        let empty = OracleScore { score: 72, reasoning: vec![] };
        assert!(empty.validate().is_err());

        let high = OracleScore { score: 230, reasoning: vec!["x".into()] };
        assert!(high.validate().is_err());
    }

    #[test]
    fn email_validation_rejects_blank_parts() {
        assert!(OracleEmail::new("", "body").validate().is_err());
        assert!(OracleEmail::new("Subject", "  ").validate().is_err());
        assert!(OracleEmail::new("Subject", "Body").validate().is_ok());
    }

    #[tokio::test]
    async fn unavailable_oracle_always_fails() {
        let oracle = UnavailableOracle;
        assert!(oracle.classify("anything").await.is_err());
        assert!(oracle.embed_batch(&["a", "b"]).await.is_err());
    }
}
