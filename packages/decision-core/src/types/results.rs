//! Ephemeral results owned by the calling workflow.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::entity::Ngo;
use crate::error::OracleError;

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Produced by the AI oracle
    Oracle,
    /// Produced by the local deterministic fallback
    Fallback,
    /// Computed by fixed local rules; no oracle was consulted
    Local,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Fallback => "fallback",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of `classify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Integer percentage, 0-100
    pub confidence: u8,
    pub reasoning: String,
    pub provenance: Provenance,
    /// Why the oracle path was abandoned, if it was
    #[serde(skip)]
    pub degraded_reason: Option<OracleError>,
}

/// A 0-100 score with ordered justifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    /// Ordered by rule evaluation, not importance
    pub reasoning: Vec<String>,
    pub provenance: Provenance,
}

impl ScoreResult {
    pub fn new(score: u8, reasoning: Vec<String>, provenance: Provenance) -> Self {
        Self {
            score: score.min(100),
            reasoning,
            provenance,
        }
    }

    /// True when a neutral midpoint stood in for a missing signal.
    pub fn is_partial(&self) -> bool {
        self.reasoning.iter().any(|r| r.starts_with(super::PARTIAL_MARKER))
    }
}

/// Relevance and priority for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityScores {
    pub relevance: ScoreResult,
    pub priority: ScoreResult,
}

/// One ranked NGO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgoMatch {
    pub ngo: Ngo,
    /// 0-100, computed for this request only
    pub alignment_score: u8,
}

/// Ranked NGOs, descending by alignment then ascending by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matches: Vec<NgoMatch>,
    pub provenance: Provenance,
}

impl MatchResult {
    pub fn empty(provenance: Provenance) -> Self {
        Self {
            matches: Vec::new(),
            provenance,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.ngo.name.as_str()).collect()
    }
}

/// Outreach email with an optional edited overlay.
///
/// Editing produces a derived draft; every read action goes through
/// `active_body` so a stale original is never used after an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    pub provenance: Provenance,
    pub edited_body: Option<String>,
}

impl EmailDraft {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            provenance,
            edited_body: None,
        }
    }

    /// Derive an edited draft. The original body is kept for reference.
    pub fn edit(&self, body: impl Into<String>) -> Self {
        Self {
            edited_body: Some(body.into()),
            ..self.clone()
        }
    }

    pub fn is_edited(&self) -> bool {
        self.edited_body.is_some()
    }

    /// Edited body if present, otherwise the generated body.
    pub fn active_body(&self) -> &str {
        self.edited_body.as_deref().unwrap_or(&self.body)
    }

    /// Text placed on the clipboard by the copy action.
    pub fn clipboard_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.active_body())
    }

    /// `mailto:` URI for the open-in-mail action.
    pub fn mailto_uri(&self) -> String {
        format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(&self.subject),
            urlencoding::encode(self.active_body())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_produces_derived_draft() {
        let draft = EmailDraft::new("Hello", "Original body", Provenance::Fallback);
        let edited = draft.edit("Edited body");

        assert_eq!(draft.active_body(), "Original body");
        assert!(!draft.is_edited());
        assert_eq!(edited.active_body(), "Edited body");
        assert_eq!(edited.body, "Original body");
        assert_eq!(edited.provenance, Provenance::Fallback);
    }

    #[test]
    fn copy_and_send_read_edited_body() {
        let draft = EmailDraft::new("Partnership", "Original", Provenance::Oracle).edit("Edited text");

        assert_eq!(draft.clipboard_text(), "Subject: Partnership\n\nEdited text");
        let uri = draft.mailto_uri();
        assert!(uri.contains("body=Edited%20text"));
        assert!(!uri.contains("Original"));
    }

    #[test]
    fn mailto_encodes_subject() {
        let draft = EmailDraft::new("AP & Telangana", "Hi", Provenance::Oracle);
        assert_eq!(draft.mailto_uri(), "mailto:?subject=AP%20%26%20Telangana&body=Hi");
    }

    #[test]
    fn score_result_caps_at_100() {
        let result = ScoreResult::new(140, vec![], Provenance::Fallback);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn provenance_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Provenance::Fallback).unwrap(), "\"fallback\"");
    }
}
