//! Relevance and priority scoring.
//!
//! `ScoringEngine` is pure: rule checks over entity attributes and a fixed
//! weighting policy for priority. `ScoringService` asks the oracle for a
//! relevance judgement first and falls back to the engine.

use tracing::{debug, info};

use crate::fallback::FallbackPolicy;
use crate::oracle::Oracle;
use crate::scale;
use crate::text;
use crate::types::category::Category;
use crate::types::entity::{Entity, EntityAttributes};
use crate::types::results::{EntityScores, Provenance, ScoreResult};
use crate::types::PARTIAL_MARKER;

/// Priority weights. Fixed policy, not configurable per call.
pub const RELEVANCE_WEIGHT: f64 = 0.5;
pub const POPULATION_WEIGHT: f64 = 0.3;
pub const PARTNERSHIP_WEIGHT: f64 = 0.2;

/// Stand-in for an unavailable signal.
pub const NEUTRAL_SIGNAL: f64 = 50.0;

/// Pilot states.
pub const PILOT_STATES: &[&str] = &["Andhra Pradesh", "Telangana"];

/// Districts targeted by the pilot.
pub const TARGET_DISTRICTS: &[&str] = &[
    "Visakhapatnam",
    "Hyderabad",
    "Guntur",
    "Krishna",
    "Rangareddy",
    "East Godavari",
    "Eluru",
    "Karimnagar",
    "Nellore",
    "Kurnool",
    "Warangal",
    "Nizamabad",
];

const MATERNAL_SERVICE_KEYWORDS: &[&str] = &[
    "maternal",
    "maternity",
    "neonatal",
    "nicu",
    "ob-gyn",
    "obstetric",
    "obstetrics",
    "gynecology",
    "gynaecology",
    "pregnancy",
    "pregnant",
    "delivery",
    "deliveries",
    "midwife",
    "midwifery",
    "antenatal",
    "postnatal",
];

const OUTREACH_KEYWORDS: &[&str] = &[
    "women",
    "mothers",
    "girls",
    "adolescent",
    "community",
    "outreach",
    "awareness",
    "asha",
    "health camps",
    "home visits",
];

const INFRASTRUCTURE_KEYWORDS: &[&str] = &[
    "bed",
    "beds",
    "icu",
    "operation theatre",
    "labour room",
    "blood bank",
    "ambulance",
    "laboratory",
    "ultrasound",
];

// Rule budgets; they sum to 100.
const SERVICE_MAX: u32 = 40;
const SERVICE_PER_HIT: u32 = 12;
const OUTREACH_MAX: u32 = 20;
const OUTREACH_PER_HIT: u32 = 7;
const TARGET_DISTRICT_POINTS: u32 = 20;
const PILOT_STATE_POINTS: u32 = 10;
const INFRA_KEYWORD_MAX: u32 = 10;
const INFRA_PER_HIT: u32 = 4;

/// Rule-based scorer. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score domain/program fit from entity attributes.
    ///
    /// Reasoning lines follow rule evaluation order: service domain,
    /// women/community outreach, district coverage, infrastructure.
    pub fn score_relevance(&self, attributes: &EntityAttributes) -> ScoreResult {
        let description = text::normalize(&attributes.description);
        let mut total = 0u32;
        let mut reasoning = Vec::with_capacity(4);

        // 1. Service domain
        let service_hits = text::matched_phrases(&description, MATERNAL_SERVICE_KEYWORDS);
        total += (service_hits.len() as u32 * SERVICE_PER_HIT).min(SERVICE_MAX);
        reasoning.push(if service_hits.is_empty() {
            "No maternal health services identified in description".to_string()
        } else {
            format!(
                "Provides maternal and child health services ({})",
                service_hits.join(", ")
            )
        });

        // 2. Women-focused and community outreach
        let outreach_hits = text::matched_phrases(&description, OUTREACH_KEYWORDS);
        total += (outreach_hits.len() as u32 * OUTREACH_PER_HIT).min(OUTREACH_MAX);
        reasoning.push(if outreach_hits.is_empty() {
            "No women-focused or community outreach programs identified".to_string()
        } else {
            format!(
                "Runs women-focused or community outreach programs ({})",
                outreach_hits.join(", ")
            )
        });

        // 3. District coverage
        let (points, line) = district_coverage(&attributes.district, &attributes.state);
        total += points;
        reasoning.push(line);

        // 4. Infrastructure
        let category_points = attributes.category.map(infrastructure_points).unwrap_or(0);
        let infra_hits = text::matched_phrases(&description, INFRASTRUCTURE_KEYWORDS);
        total += category_points + (infra_hits.len() as u32 * INFRA_PER_HIT).min(INFRA_KEYWORD_MAX);
        reasoning.push(infrastructure_line(attributes.category, &infra_hits, category_points));

        ScoreResult::new(scale::clamp_score(f64::from(total)), reasoning, Provenance::Local)
    }

    /// Composite priority: round(0.5 × relevance + 0.3 × population + 0.2 × partnership).
    ///
    /// Inputs are clamped to [0,100]. A missing signal is replaced by the
    /// neutral midpoint and the result is flagged partial.
    pub fn score_priority(
        &self,
        relevance: f64,
        population_signal: Option<f64>,
        partnership_signal: Option<f64>,
    ) -> ScoreResult {
        let relevance = scale::clamp_signal(relevance);
        let population = population_signal.map(scale::clamp_signal).unwrap_or(NEUTRAL_SIGNAL);
        let partnership = partnership_signal.map(scale::clamp_signal).unwrap_or(NEUTRAL_SIGNAL);

        let combined = RELEVANCE_WEIGHT * relevance
            + POPULATION_WEIGHT * population
            + PARTNERSHIP_WEIGHT * partnership;

        let mut reasoning = vec![
            format!("Relevance {:.0} × {} = {:.1}", relevance, RELEVANCE_WEIGHT, RELEVANCE_WEIGHT * relevance),
            format!("Population reach {:.0} × {} = {:.1}", population, POPULATION_WEIGHT, POPULATION_WEIGHT * population),
            format!("Partnership {:.0} × {} = {:.1}", partnership, PARTNERSHIP_WEIGHT, PARTNERSHIP_WEIGHT * partnership),
        ];
        if population_signal.is_none() {
            reasoning.push(format!(
                "{} population signal unavailable, neutral {:.0} used",
                PARTIAL_MARKER, NEUTRAL_SIGNAL
            ));
        }
        if partnership_signal.is_none() {
            reasoning.push(format!(
                "{} partnership signal unavailable, neutral {:.0} used",
                PARTIAL_MARKER, NEUTRAL_SIGNAL
            ));
        }

        ScoreResult::new(scale::clamp_score(combined), reasoning, Provenance::Local)
    }
}

fn district_coverage(district: &str, state: &str) -> (u32, String) {
    let district = district.trim();
    let state = state.trim();

    if let Some(target) = TARGET_DISTRICTS
        .iter()
        .find(|d| !district.is_empty() && d.eq_ignore_ascii_case(district))
    {
        return (TARGET_DISTRICT_POINTS, format!("Located in {}, a target district", target));
    }
    if let Some(pilot) = PILOT_STATES
        .iter()
        .find(|s| !state.is_empty() && s.eq_ignore_ascii_case(state))
    {
        return (PILOT_STATE_POINTS, format!("Located in {}, a pilot state", pilot));
    }
    if district.is_empty() && state.is_empty() {
        return (0, "Location unknown".to_string());
    }
    (0, "Outside the Andhra Pradesh and Telangana pilot geography".to_string())
}

fn infrastructure_points(category: Category) -> u32 {
    match category {
        Category::PrivateHospital | Category::GovernmentHospital | Category::MedicalCollege => 10,
        Category::Phc => 6,
        Category::Ngo => 4,
        Category::Corporate => 2,
        Category::Funder => 0,
    }
}

fn infrastructure_line(category: Option<Category>, hits: &[&str], category_points: u32) -> String {
    if category_points == 0 && hits.is_empty() {
        return "Limited healthcare infrastructure signals".to_string();
    }
    let mut signals: Vec<String> = Vec::new();
    if let Some(category) = category.filter(|_| category_points > 0) {
        signals.push(category.to_string());
    }
    signals.extend(hits.iter().map(|h| h.to_string()));
    format!("Has established healthcare infrastructure ({})", signals.join(", "))
}

/// Sort by priority desc, relevance desc, then name asc.
pub fn rank_by_priority(entities: &[Entity], limit: Option<usize>) -> Vec<Entity> {
    let mut ranked = entities.to_vec();
    ranked.sort_by(|a, b| {
        b.priority_score
            .cmp(&a.priority_score)
            .then_with(|| b.relevance_score.cmp(&a.relevance_score))
            .then_with(|| a.name.cmp(&b.name))
    });
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Oracle-assisted entity scoring with rule-based fallback.
pub struct ScoringService<O: Oracle> {
    oracle: O,
    engine: ScoringEngine,
    policy: FallbackPolicy,
}

impl<O: Oracle> ScoringService<O> {
    pub fn new(oracle: O, policy: FallbackPolicy) -> Self {
        Self {
            oracle,
            engine: ScoringEngine::new(),
            policy,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Relevance (oracle or rules) plus priority from the fixed policy.
    pub async fn score_entity(&self, attributes: &EntityAttributes) -> EntityScores {
        let relevance = if attributes.description.trim().is_empty() {
            debug!(entity = %attributes.name, "No description, scoring with rules only");
            self.engine.score_relevance(attributes)
        } else {
            let engine = self.engine;
            let sourced = self
                .policy
                .run(
                    "score_relevance",
                    async {
                        let raw = self.oracle.score_relevance(attributes).await?;
                        raw.validate()
                    },
                    || {
                        let rules = engine.score_relevance(attributes);
                        (rules.score, rules.reasoning)
                    },
                )
                .await;
            ScoreResult::new(sourced.value.0, sourced.value.1, sourced.provenance)
        };

        let priority = self.engine.score_priority(
            f64::from(relevance.score),
            attributes.population_signal,
            attributes.partnership_signal,
        );

        info!(
            entity = %attributes.name,
            relevance = relevance.score,
            priority = priority.score,
            provenance = %relevance.provenance,
            partial = priority.is_partial(),
            "Scored entity"
        );

        EntityScores { relevance, priority }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maternity_hospital() -> EntityAttributes {
        EntityAttributes::new("Guntur District Hospital")
            .with_category(Category::GovernmentHospital)
            .with_location("Guntur", "Andhra Pradesh")
            .with_description(
                "200-bed maternity hospital with NICU, labour room and blood bank. \
                 Runs antenatal outreach camps for women in the community.",
            )
    }

    #[test]
    fn priority_scenario() {
        let result = ScoringEngine::new().score_priority(80.0, Some(60.0), Some(40.0));
        assert_eq!(result.score, 66);
        assert!(!result.is_partial());
        assert_eq!(result.reasoning.len(), 3);
    }

    #[test]
    fn missing_signals_use_midpoint_and_flag_partial() {
        let result = ScoringEngine::new().score_priority(80.0, None, Some(40.0));
        // 40 + 15 + 8
        assert_eq!(result.score, 63);
        assert!(result.is_partial());
        assert!(result.reasoning.last().unwrap().contains("population signal unavailable"));

        let both = ScoringEngine::new().score_priority(80.0, None, None);
        assert_eq!(both.score, 65);
        assert_eq!(both.reasoning.iter().filter(|r| r.starts_with(PARTIAL_MARKER)).count(), 2);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let result = ScoringEngine::new().score_priority(150.0, Some(-20.0), Some(300.0));
        // 50 + 0 + 20
        assert_eq!(result.score, 70);
    }

    #[test]
    fn relevance_reasoning_follows_rule_order() {
        let result = ScoringEngine::new().score_relevance(&maternity_hospital());
        assert_eq!(result.reasoning.len(), 4);
        assert!(result.reasoning[0].starts_with("Provides maternal and child health services"));
        assert!(result.reasoning[1].starts_with("Runs women-focused"));
        assert_eq!(result.reasoning[2], "Located in Guntur, a target district");
        assert!(result.reasoning[3].starts_with("Has established healthcare infrastructure (Government Hospital"));
        assert_eq!(result.provenance, Provenance::Local);
    }

    #[test]
    fn strong_candidate_scores_high() {
        let result = ScoringEngine::new().score_relevance(&maternity_hospital());
        // service: maternity, nicu, antenatal = 36; outreach: women, community, outreach = 20
        // district 20; infra: 10 + bed, labour room, blood bank capped at 10
        assert_eq!(result.score, 96);
    }

    #[test]
    fn relevance_is_stable_across_calls() {
        let engine = ScoringEngine::new();
        let attributes = maternity_hospital();
        assert_eq!(engine.score_relevance(&attributes), engine.score_relevance(&attributes));
    }

    #[test]
    fn unrelated_entity_scores_low() {
        let attributes = EntityAttributes::new("Acme Logistics")
            .with_category(Category::Corporate)
            .with_location("Pune", "Maharashtra")
            .with_description("Warehousing and freight services");
        let result = ScoringEngine::new().score_relevance(&attributes);
        assert_eq!(result.score, 2);
        assert_eq!(result.reasoning[2], "Outside the Andhra Pradesh and Telangana pilot geography");
    }

    #[test]
    fn pilot_state_without_target_district() {
        let attributes = EntityAttributes::new("Ongole PHC")
            .with_category(Category::Phc)
            .with_location("Prakasam", "andhra pradesh");
        let result = ScoringEngine::new().score_relevance(&attributes);
        assert_eq!(result.reasoning[2], "Located in Andhra Pradesh, a pilot state");
        assert_eq!(result.score, 16);
    }

    #[test]
    fn ranking_breaks_ties_by_relevance_then_name() {
        let entities = vec![
            Entity::new("Zeta Clinic", Category::PrivateHospital).with_scores(70, 80),
            Entity::new("Alpha Clinic", Category::PrivateHospital).with_scores(70, 80),
            Entity::new("Beta Hospital", Category::GovernmentHospital).with_scores(90, 80),
            Entity::new("Top PHC", Category::Phc).with_scores(60, 95),
        ];
        let ranked = rank_by_priority(&entities, Some(3));
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Top PHC", "Beta Hospital", "Alpha Clinic"]);
    }
}
