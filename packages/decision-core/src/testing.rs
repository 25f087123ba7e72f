//! Testing utilities including a mock oracle.
//!
//! Useful for exercising the decision services without real model calls:
//! canned responses, forced failures, artificial latency and call tracking.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::classification::classify_by_keywords;
use crate::error::{OracleError, OracleResult};
use crate::oracle::{Oracle, OracleClassification, OracleEmail, OracleScore, OutreachRequest};
use crate::types::entity::EntityAttributes;

/// Oracle operations, for targeting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Classify,
    ScoreRelevance,
    Embed,
    GenerateOutreach,
}

/// Record of a call made to the mock oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOracleCall {
    Classify { description: String },
    ScoreRelevance { name: String },
    Embed { text: String },
    GenerateOutreach { organization_name: String },
}

/// A mock oracle for testing.
///
/// Unconfigured inputs get deterministic defaults: keyword-derived
/// classifications at high confidence, a fixed relevance score, hash-seeded
/// embeddings and a short generated email.
pub struct MockOracle {
    classifications: HashMap<String, OracleClassification>,
    scores: HashMap<String, OracleScore>,
    embeddings: HashMap<String, Vec<f32>>,
    emails: HashMap<String, OracleEmail>,
    embedding_dim: usize,
    delay: Option<Duration>,
    failures: Mutex<HashMap<MockOperation, OracleError>>,
    calls: Mutex<Vec<MockOracleCall>>,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            classifications: HashMap::new(),
            scores: HashMap::new(),
            embeddings: HashMap::new(),
            emails: HashMap::new(),
            embedding_dim: 64,
            delay: None,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every operation fails with `error`.
    pub fn failing(error: OracleError) -> Self {
        let mock = Self::new();
        for op in [
            MockOperation::Classify,
            MockOperation::ScoreRelevance,
            MockOperation::Embed,
            MockOperation::GenerateOutreach,
        ] {
            mock.set_failure(op, error.clone());
        }
        mock
    }

    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Canned classification for an exact description.
    pub fn with_classification(mut self, description: impl Into<String>, response: OracleClassification) -> Self {
        self.classifications.insert(description.into(), response);
        self
    }

    /// Canned relevance score for an entity name.
    pub fn with_score(mut self, name: impl Into<String>, response: OracleScore) -> Self {
        self.scores.insert(name.into(), response);
        self
    }

    /// Canned embedding for an exact text.
    pub fn with_embedding(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings.insert(text.into(), embedding);
        self
    }

    /// Canned email for an organization name.
    pub fn with_email(mut self, organization_name: impl Into<String>, response: OracleEmail) -> Self {
        self.emails.insert(organization_name.into(), response);
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_failure(self, operation: MockOperation, error: OracleError) -> Self {
        self.set_failure(operation, error);
        self
    }

    /// Make `operation` fail from now on.
    pub fn set_failure(&self, operation: MockOperation, error: OracleError) {
        guard(&self.failures).insert(operation, error);
    }

    pub fn clear_failures(&self) {
        guard(&self.failures).clear();
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockOracleCall> {
        guard(&self.calls).clone()
    }

    /// Number of calls of one kind.
    pub fn call_count(&self, operation: MockOperation) -> usize {
        guard(&self.calls)
            .iter()
            .filter(|call| {
                let op = match call {
                    MockOracleCall::Classify { .. } => MockOperation::Classify,
                    MockOracleCall::ScoreRelevance { .. } => MockOperation::ScoreRelevance,
                    MockOracleCall::Embed { .. } => MockOperation::Embed,
                    MockOracleCall::GenerateOutreach { .. } => MockOperation::GenerateOutreach,
                };
                op == operation
            })
            .count()
    }

    pub fn clear_calls(&self) {
        guard(&self.calls).clear();
    }

    async fn enter(&self, operation: MockOperation, call: MockOracleCall) -> OracleResult<()> {
        guard(&self.calls).push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match guard(&self.failures).get(&operation).cloned() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Deterministic embedding seeded from the text hash.
    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        (0..self.embedding_dim)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                (byte / 127.5) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn classify(&self, description: &str) -> OracleResult<OracleClassification> {
        self.enter(
            MockOperation::Classify,
            MockOracleCall::Classify {
                description: description.to_string(),
            },
        )
        .await?;

        Ok(self
            .classifications
            .get(description)
            .cloned()
            .unwrap_or_else(|| {
                let (category, _, _) = classify_by_keywords(description);
                OracleClassification::new(category.as_str(), 95, "Mock oracle classification")
            }))
    }

    async fn score_relevance(&self, attributes: &EntityAttributes) -> OracleResult<OracleScore> {
        self.enter(
            MockOperation::ScoreRelevance,
            MockOracleCall::ScoreRelevance {
                name: attributes.name.clone(),
            },
        )
        .await?;

        Ok(self
            .scores
            .get(&attributes.name)
            .cloned()
            .unwrap_or_else(|| OracleScore {
                score: 75,
                reasoning: vec!["Mock oracle assessment".to_string()],
            }))
    }

    async fn embed(&self, text: &str) -> OracleResult<Vec<f32>> {
        self.enter(
            MockOperation::Embed,
            MockOracleCall::Embed {
                text: text.to_string(),
            },
        )
        .await?;

        Ok(self
            .embeddings
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.deterministic_embedding(text)))
    }

    async fn generate_outreach(&self, request: &OutreachRequest) -> OracleResult<OracleEmail> {
        self.enter(
            MockOperation::GenerateOutreach,
            MockOracleCall::GenerateOutreach {
                organization_name: request.organization_name.clone(),
            },
        )
        .await?;

        Ok(self
            .emails
            .get(&request.organization_name)
            .cloned()
            .unwrap_or_else(|| {
                OracleEmail::new(
                    format!("Maternal health partnership with {}", request.organization_name),
                    format!(
                        "Dear {} team,\n\nWe would like to partner with you in {}.\n\nMotherSource AI Team",
                        request.organization_name, request.district
                    ),
                )
            }))
    }
}
