//! Closed organization taxonomy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Organization type.
///
/// Declaration order is significant: keyword ties in the fallback
/// classifier resolve to the earliest variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    #[serde(rename = "Private Hospital")]
    PrivateHospital,
    #[serde(rename = "Government Hospital")]
    GovernmentHospital,
    #[serde(rename = "Medical College")]
    MedicalCollege,
    #[serde(rename = "PHC")]
    Phc,
    #[serde(rename = "NGO")]
    Ngo,
    #[serde(rename = "Corporate")]
    Corporate,
    #[serde(rename = "Funder")]
    Funder,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 7] = [
        Category::PrivateHospital,
        Category::GovernmentHospital,
        Category::MedicalCollege,
        Category::Phc,
        Category::Ngo,
        Category::Corporate,
        Category::Funder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrivateHospital => "Private Hospital",
            Self::GovernmentHospital => "Government Hospital",
            Self::MedicalCollege => "Medical College",
            Self::Phc => "PHC",
            Self::Ngo => "NGO",
            Self::Corporate => "Corporate",
            Self::Funder => "Funder",
        }
    }

    /// Parse a human label, case-insensitively.
    ///
    /// Accepts the canonical labels, the long PHC form, and funder subtype
    /// labels (which map to `Funder`). Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(category) = Self::ALL
            .iter()
            .find(|c| c.as_str().to_lowercase() == needle)
        {
            return Some(*category);
        }

        match needle.as_str() {
            "phc (primary health centre)" | "primary health centre" | "primary health center" => {
                Some(Self::Phc)
            }
            _ => FunderKind::from_label(&needle).map(|_| Self::Funder),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Funder subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FunderKind {
    #[serde(rename = "Global Foundation")]
    GlobalFoundation,
    #[serde(rename = "Indian Foundation")]
    IndianFoundation,
    #[serde(rename = "UN Agency")]
    UnAgency,
    #[serde(rename = "CSR")]
    Csr,
    #[serde(rename = "Government Aid")]
    GovernmentAid,
}

impl FunderKind {
    pub const ALL: [FunderKind; 5] = [
        FunderKind::GlobalFoundation,
        FunderKind::IndianFoundation,
        FunderKind::UnAgency,
        FunderKind::Csr,
        FunderKind::GovernmentAid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalFoundation => "Global Foundation",
            Self::IndianFoundation => "Indian Foundation",
            Self::UnAgency => "UN Agency",
            Self::Csr => "CSR",
            Self::GovernmentAid => "Government Aid",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().to_lowercase() == needle)
    }
}

impl std::fmt::Display for FunderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
