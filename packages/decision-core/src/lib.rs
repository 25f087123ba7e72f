//! Oracle-or-fallback decision services for maternal health outreach.
//!
//! Classify organizations, score their relevance and priority, match NGOs
//! to a program description and draft partnership emails. Every operation
//! first asks an AI oracle under a timeout, and when the oracle is slow,
//! down or returns something unusable, answers from a deterministic local
//! rule instead. Results carry a `Provenance` tag so degraded answers are
//! visible without being disruptive.
//!
//! # Usage
//!
//! ```rust,ignore
//! use decision_core::{DecisionConfig, DecisionEngine, UnavailableOracle, Category};
//!
//! let engine = DecisionEngine::new(UnavailableOracle, DecisionConfig::default());
//!
//! let class = engine.classify("runs a 200-bed maternity ward with NICU, government-funded").await?;
//! let draft = engine.generate_outreach("Lotus Hospital", Category::PrivateHospital, "Guntur").await?;
//! ```
//!
//! # Modules
//!
//! - [`taxonomy`] - Category keyword tables for the classification fallback
//! - [`scoring`] - Rule-based relevance, fixed-weight priority, ranking
//! - [`classification`] - Description to category
//! - [`matching`] - Program to NGO alignment, embedding cache
//! - [`templates`] - Category-keyed outreach templates
//! - [`outreach`] - Draft generation and regeneration
//! - [`fallback`] - Timeout-bounded oracle call with local fallback
//! - [`slots`] - Latest-request-wins bookkeeping
//! - [`testing`] - Mock oracle for tests

pub mod classification;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod matching;
pub mod oracle;
pub mod outreach;
pub mod prompts;
pub mod scale;
pub mod scoring;
pub mod slots;
pub mod taxonomy;
pub mod templates;
pub mod testing;
pub mod text;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use config::DecisionConfig;
pub use engine::DecisionEngine;
pub use error::{DecisionError, OracleError, OracleResult, Result};
pub use fallback::{FallbackPolicy, Sourced};
pub use oracle::{
    Oracle, OracleClassification, OracleEmail, OracleScore, OutreachRequest, UnavailableOracle,
};
pub use scale::PriorityTier;
pub use slots::{RequestSlots, Ticket};
pub use types::{
    category::{Category, FunderKind},
    entity::{Entity, EntityAttributes, Funder, Ngo},
    results::{
        ClassificationResult, EmailDraft, EntityScores, MatchResult, NgoMatch, Provenance,
        ScoreResult,
    },
};

// Re-export services
pub use classification::{classify_by_keywords, ClassificationService};
pub use matching::{
    cosine_similarity, find_duplicate, CacheKey, EmbeddingCache, MatchingService, DUPLICATE_THRESHOLD,
};
pub use outreach::OutreachService;
pub use scoring::{rank_by_priority, ScoringEngine, ScoringService};
pub use templates::TemplateEngine;

#[cfg(feature = "openai")]
pub use ai::OpenAIOracle;
