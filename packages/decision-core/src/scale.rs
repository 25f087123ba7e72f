//! Conversions onto the 0-100 integer scale used at the service boundary.
//!
//! Internal producers may work in [0,1] (similarities, model
//! probabilities). They are converted here and nowhere else.

use serde::{Deserialize, Serialize};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Clamp to [0,100] and round half away from zero. NaN maps to 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(SCORE_MIN, SCORE_MAX).round() as u8
}

/// Clamp without rounding, for inputs combined before the final round.
pub fn clamp_signal(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Convert a [0,1] value to the 0-100 scale.
pub fn from_unit_interval(value: f64) -> u8 {
    clamp_score(value * 100.0)
}

/// Map cosine similarity in [-1,1] to an alignment score.
pub fn from_similarity(similarity: f32) -> u8 {
    from_unit_interval((f64::from(similarity) + 1.0) / 2.0)
}

/// Display tier for a priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// 90 and above
    High,
    /// 75-89
    Strong,
    /// 60-74
    Moderate,
    /// Below 60
    Low,
}

impl PriorityTier {
    pub fn for_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::High,
            75..=89 => Self::Strong,
            60..=74 => Self::Moderate,
            _ => Self::Low,
        }
    }
}
