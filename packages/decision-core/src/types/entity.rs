//! Records read from the data store.
//!
//! The core never writes derived scores back; callers persist them if
//! they choose to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::{Category, FunderKind};

/// Healthcare or partner organization tracked for outreach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub district: String,
    pub state: String,

    // Contact
    pub address: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    pub description: String,

    /// 0-100
    pub relevance_score: u8,
    /// 0-100
    pub priority_score: u8,

    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            district: String::new(),
            state: String::new(),
            address: None,
            website: None,
            email: None,
            phone: None,
            description: String::new(),
            relevance_score: 0,
            priority_score: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, district: impl Into<String>, state: impl Into<String>) -> Self {
        self.district = district.into();
        self.state = state.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scores(mut self, relevance: u8, priority: u8) -> Self {
        self.relevance_score = relevance.min(100);
        self.priority_score = priority.min(100);
        self
    }

    /// Attributes the scoring engine evaluates.
    pub fn attributes(&self) -> EntityAttributes {
        EntityAttributes {
            name: self.name.clone(),
            category: Some(self.category),
            district: self.district.clone(),
            state: self.state.clone(),
            description: self.description.clone(),
            population_signal: None,
            partnership_signal: None,
        }
    }
}

/// Input to relevance and priority scoring.
///
/// Population and partnership signals are optional; missing signals are
/// substituted with a neutral midpoint and the result is flagged partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityAttributes {
    pub name: String,
    pub category: Option<Category>,
    pub district: String,
    pub state: String,
    pub description: String,
    pub population_signal: Option<f64>,
    pub partnership_signal: Option<f64>,
}

impl EntityAttributes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_location(mut self, district: impl Into<String>, state: impl Into<String>) -> Self {
        self.district = district.into();
        self.state = state.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_population_signal(mut self, signal: f64) -> Self {
        self.population_signal = Some(signal);
        self
    }

    pub fn with_partnership_signal(mut self, signal: f64) -> Self {
        self.partnership_signal = Some(signal);
        self
    }
}

/// NGO in the matching corpus.
///
/// Alignment is request-scoped and lives on `NgoMatch`, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ngo {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    /// Ordered focus-area tags
    #[serde(default)]
    pub focus_areas: Vec<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Ngo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            district: String::new(),
            state: String::new(),
            focus_areas: Vec::new(),
            website: None,
            description: description.into(),
        }
    }

    pub fn with_focus_areas(mut self, areas: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.focus_areas = areas.into_iter().map(|a| a.into()).collect();
        self
    }

    pub fn with_location(mut self, district: impl Into<String>, state: impl Into<String>) -> Self {
        self.district = district.into();
        self.state = state.into();
        self
    }

    /// Text submitted for embedding: focus areas followed by description.
    pub fn embedding_text(&self) -> String {
        let focus = self.focus_areas.join(" ");
        format!("{} {}", focus, self.description).trim().to_string()
    }
}

/// Grant-making organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funder {
    pub id: Uuid,
    pub name: String,
    pub funder_type: FunderKind,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    pub grant_size: Option<String>,
    #[serde(default)]
    pub geography: String,
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    /// 0-100
    pub relevance_score: u8,
}

impl Funder {
    pub fn new(name: impl Into<String>, funder_type: FunderKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            funder_type,
            focus_areas: Vec::new(),
            grant_size: None,
            geography: String::new(),
            website: None,
            description: String::new(),
            relevance_score: 0,
        }
    }

    /// Funders always use the funder category for templates and prompts.
    pub fn category(&self) -> Category {
        Category::from(self.funder_type)
    }
}

impl From<FunderKind> for Category {
    fn from(_: FunderKind) -> Self {
        Category::Funder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ngo_embedding_text_puts_focus_areas_first() {
        let ngo = Ngo::new("Jeevan Trust", "Runs village health camps")
            .with_focus_areas(["maternal health", "nutrition"]);
        assert_eq!(
            ngo.embedding_text(),
            "maternal health nutrition Runs village health camps"
        );
    }

    #[test]
    fn ngo_embedding_text_without_focus_areas() {
        let ngo = Ngo::new("Jeevan Trust", "Runs village health camps");
        assert_eq!(ngo.embedding_text(), "Runs village health camps");
    }

    #[test]
    fn entity_scores_are_capped() {
        let entity = Entity::new("Lotus Hospital", Category::PrivateHospital).with_scores(120, 250);
        assert_eq!(entity.relevance_score, 100);
        assert_eq!(entity.priority_score, 100);
    }

    #[test]
    fn funder_category_is_funder() {
        let funder = Funder::new("Gates Foundation", FunderKind::GlobalFoundation);
        assert_eq!(funder.category(), Category::Funder);
    }

    #[test]
    fn ngo_deserializes_with_missing_optional_fields() {
        let ngo: Ngo = serde_json::from_str(
            r#"{"id":"6f1c2a1e-6d1b-4f7e-9b53-0c1d2e3f4a5b","name":"Asha Kiran","website":null}"#,
        )
        .unwrap();
        assert!(ngo.focus_areas.is_empty());
        assert_eq!(ngo.description, "");
    }
}
