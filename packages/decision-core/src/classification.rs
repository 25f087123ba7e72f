//! Organization classification.
//!
//! Asks the oracle for a category first. When the oracle is slow, down,
//! or answers with something outside the taxonomy, the keyword tables in
//! `taxonomy` decide instead.

use tracing::info;

use crate::error::{require_text, Result};
use crate::fallback::FallbackPolicy;
use crate::oracle::Oracle;
use crate::taxonomy::{self, CategoryHits};
use crate::types::category::Category;
use crate::types::results::ClassificationResult;

/// Confidence reported when no keyword matched at all.
pub const NO_HIT_CONFIDENCE: u8 = 40;
const BASE_CONFIDENCE: u8 = 60;
const PER_HIT_CONFIDENCE: u8 = 8;
const MAX_FALLBACK_CONFIDENCE: u8 = 90;

/// Deterministic classification from keyword hits.
///
/// Same description in, same category, confidence and reasoning out.
pub fn classify_by_keywords(description: &str) -> (Category, u8, String) {
    let best = taxonomy::best_match(description);
    let confidence = fallback_confidence(&best);
    let reasoning = fallback_reasoning(&best);
    (best.category, confidence, reasoning)
}

fn fallback_confidence(hits: &CategoryHits) -> u8 {
    match hits.count() {
        0 => NO_HIT_CONFIDENCE,
        n => {
            let n = u8::try_from(n).unwrap_or(u8::MAX);
            BASE_CONFIDENCE
                .saturating_add(PER_HIT_CONFIDENCE.saturating_mul(n))
                .min(MAX_FALLBACK_CONFIDENCE)
        }
    }
}

fn fallback_reasoning(hits: &CategoryHits) -> String {
    if hits.keywords.is_empty() {
        return format!(
            "No category keywords found; defaulted to {}.",
            hits.category
        );
    }
    let quoted: Vec<String> = hits.keywords.iter().map(|k| format!("'{}'", k)).collect();
    format!(
        "Keyword match for {}: {}.",
        hits.category,
        quoted.join(", ")
    )
}

/// Classifies free-text organization descriptions into a `Category`.
pub struct ClassificationService<O: Oracle> {
    oracle: O,
    policy: FallbackPolicy,
}

impl<O: Oracle> ClassificationService<O> {
    pub fn new(oracle: O, policy: FallbackPolicy) -> Self {
        Self { oracle, policy }
    }

    /// Classify a description.
    ///
    /// Only a blank description is an error; every oracle failure
    /// resolves to the keyword fallback.
    pub async fn classify(&self, description: &str) -> Result<ClassificationResult> {
        let description = require_text("description", description)?;

        let sourced = self
            .policy
            .run(
                "classify",
                async {
                    let raw = self.oracle.classify(description).await?;
                    raw.validate()
                },
                || classify_by_keywords(description),
            )
            .await;

        let (category, confidence, reasoning) = sourced.value;
        info!(
            category = %category,
            confidence,
            provenance = %sourced.provenance,
            "Classified organization"
        );

        Ok(ClassificationResult {
            category,
            confidence,
            reasoning,
            provenance: sourced.provenance,
            degraded_reason: sourced.degraded_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_scenario_cites_matched_keywords() {
        let (category, confidence, reasoning) =
            classify_by_keywords("runs a 200-bed maternity ward with NICU, government-funded");
        assert_eq!(category, Category::GovernmentHospital);
        assert_eq!(confidence, 84);
        assert_eq!(
            reasoning,
            "Keyword match for Government Hospital: 'government-funded', 'bed', 'maternity'."
        );
    }

    #[test]
    fn no_keywords_defaults_with_low_confidence() {
        let (category, confidence, reasoning) = classify_by_keywords("xyz qrs");
        assert_eq!(category, taxonomy::DEFAULT_CATEGORY);
        assert_eq!(confidence, NO_HIT_CONFIDENCE);
        assert!(reasoning.starts_with("No category keywords found"));
    }

    #[test]
    fn confidence_is_capped() {
        let hits = CategoryHits {
            category: Category::Ngo,
            keywords: vec!["a", "b", "c", "d", "e", "f", "g"],
        };
        assert_eq!(fallback_confidence(&hits), MAX_FALLBACK_CONFIDENCE);
    }

    #[test]
    fn keyword_classification_is_deterministic() {
        let text = "District hospital with a labour room and blood bank";
        assert_eq!(classify_by_keywords(text), classify_by_keywords(text));
    }
}
