//! Caller-facing facade over the decision services.

use std::sync::Arc;
use uuid::Uuid;

use crate::classification::ClassificationService;
use crate::config::DecisionConfig;
use crate::error::Result;
use crate::fallback::FallbackPolicy;
use crate::matching::{EmbeddingCache, MatchingService};
use crate::oracle::Oracle;
use crate::outreach::OutreachService;
use crate::scoring::ScoringService;
use crate::templates::TemplateEngine;
use crate::types::category::Category;
use crate::types::entity::{EntityAttributes, Ngo};
use crate::types::results::{ClassificationResult, EmailDraft, EntityScores, MatchResult};

/// The decision operations, sharing one oracle, timeout and embedding cache.
///
/// # Example
///
/// ```rust,ignore
/// let engine = DecisionEngine::new(UnavailableOracle, DecisionConfig::default());
/// let result = engine.classify("200-bed maternity ward, government-funded").await?;
/// assert_eq!(result.provenance, Provenance::Fallback);
/// ```
pub struct DecisionEngine<O: Oracle> {
    classification: ClassificationService<Arc<O>>,
    scoring: ScoringService<Arc<O>>,
    matching: MatchingService<Arc<O>>,
    outreach: OutreachService<Arc<O>>,
    config: DecisionConfig,
}

impl<O: Oracle> DecisionEngine<O> {
    pub fn new(oracle: O, config: DecisionConfig) -> Self {
        Self::with_cache(oracle, config, Arc::new(EmbeddingCache::new()))
    }

    /// Build with an existing embedding cache, e.g. one shared across engines.
    pub fn with_cache(oracle: O, config: DecisionConfig, cache: Arc<EmbeddingCache>) -> Self {
        let oracle = Arc::new(oracle);
        let policy = FallbackPolicy::new(config.oracle_timeout);
        let templates = TemplateEngine::new(config.default_district.clone());

        Self {
            classification: ClassificationService::new(oracle.clone(), policy),
            scoring: ScoringService::new(oracle.clone(), policy),
            matching: MatchingService::new(oracle.clone(), policy)
                .with_cache(cache)
                .with_limit(config.match_result_limit),
            outreach: OutreachService::new(oracle, templates, policy),
            config,
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn embedding_cache(&self) -> &Arc<EmbeddingCache> {
        self.matching.cache()
    }

    pub async fn classify(&self, description: &str) -> Result<ClassificationResult> {
        self.classification.classify(description).await
    }

    /// Never fails: scoring is total over its inputs.
    pub async fn score_entity(&self, attributes: &EntityAttributes) -> EntityScores {
        self.scoring.score_entity(attributes).await
    }

    pub async fn match_ngos(&self, program: &str, corpus: &[Ngo]) -> Result<MatchResult> {
        self.matching.match_ngos(program, corpus).await
    }

    /// Id of an existing entity that `text` duplicates, if any.
    pub async fn check_duplicate(&self, text: &str, existing: &[(Uuid, Vec<f32>)]) -> Result<Option<Uuid>> {
        self.matching.check_duplicate(text, existing).await
    }

    pub async fn generate_outreach(
        &self,
        organization_name: &str,
        category: Category,
        district: &str,
    ) -> Result<EmailDraft> {
        self.outreach.generate(organization_name, category, district).await
    }

    pub async fn regenerate_outreach(
        &self,
        organization_name: &str,
        category: Category,
        district: &str,
    ) -> Result<EmailDraft> {
        self.outreach.regenerate(organization_name, category, district).await
    }
}
