//! Static taxonomy rules for degraded-mode classification.
//!
//! Pure lookups. Unknown text falls through to the default category.

use crate::text;
use crate::types::category::Category;

/// Category used when no keyword matches.
pub const DEFAULT_CATEGORY: Category = Category::PrivateHospital;

const PRIVATE_HOSPITAL_KEYWORDS: &[&str] = &[
    "private",
    "multi-specialty",
    "multispecialty",
    "super-specialty",
    "super speciality",
    "corporate hospital",
    "nursing home",
    "fertility",
    "ivf",
    "clinic",
];

const GOVERNMENT_HOSPITAL_KEYWORDS: &[&str] = &[
    "government-funded",
    "government hospital",
    "govt",
    "district hospital",
    "area hospital",
    "civil hospital",
    "public hospital",
    "state-run",
    "bed",
    "maternity",
    "jssk",
    "nhm",
];

const MEDICAL_COLLEGE_KEYWORDS: &[&str] = &[
    "medical college",
    "teaching hospital",
    "mbbs",
    "medical sciences",
    "postgraduate",
    "faculty",
    "medical students",
    "residency",
];

const PHC_KEYWORDS: &[&str] = &[
    "phc",
    "primary health centre",
    "primary health center",
    "sub-centre",
    "anm",
    "asha",
    "rural health",
    "village",
    "mandal",
];

const NGO_KEYWORDS: &[&str] = &[
    "ngo",
    "non-profit",
    "nonprofit",
    "not-for-profit",
    "charitable",
    "trust",
    "society",
    "volunteers",
    "grassroots",
    "community-based",
];

const CORPORATE_KEYWORDS: &[&str] = &[
    "csr",
    "corporate",
    "company",
    "pvt ltd",
    "limited",
    "industries",
    "pharmaceutical",
    "enterprise",
];

const FUNDER_KEYWORDS: &[&str] = &[
    "foundation",
    "grant",
    "grants",
    "grant-making",
    "philanthropy",
    "philanthropic",
    "donor",
    "funding",
    "fellowship",
];

/// Keyword set for a category.
pub fn keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::PrivateHospital => PRIVATE_HOSPITAL_KEYWORDS,
        Category::GovernmentHospital => GOVERNMENT_HOSPITAL_KEYWORDS,
        Category::MedicalCollege => MEDICAL_COLLEGE_KEYWORDS,
        Category::Phc => PHC_KEYWORDS,
        Category::Ngo => NGO_KEYWORDS,
        Category::Corporate => CORPORATE_KEYWORDS,
        Category::Funder => FUNDER_KEYWORDS,
    }
}

/// Keywords of one category found in a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHits {
    pub category: Category,
    /// In keyword-table order
    pub keywords: Vec<&'static str>,
}

impl CategoryHits {
    pub fn count(&self) -> usize {
        self.keywords.len()
    }
}

/// Hits for every category, in declaration order.
pub fn keyword_hits(description: &str) -> Vec<CategoryHits> {
    let normalized = text::normalize(description);
    Category::ALL
        .iter()
        .map(|&category| CategoryHits {
            category,
            keywords: text::matched_phrases(&normalized, keywords(category)),
        })
        .collect()
}

/// Category with the most hits; ties go to the earliest declared category.
///
/// Zero hits anywhere yields `DEFAULT_CATEGORY` with no keywords.
pub fn best_match(description: &str) -> CategoryHits {
    let mut best: Option<CategoryHits> = None;
    for hits in keyword_hits(description) {
        let better = match &best {
            Some(current) => hits.count() > current.count(),
            None => hits.count() > 0,
        };
        if better {
            best = Some(hits);
        }
    }

    best.unwrap_or(CategoryHits {
        category: DEFAULT_CATEGORY,
        keywords: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn government_maternity_ward_scenario() {
        let best = best_match("runs a 200-bed maternity ward with NICU, government-funded");
        assert_eq!(best.category, Category::GovernmentHospital);
        assert_eq!(best.keywords, vec!["government-funded", "bed", "maternity"]);
    }

    #[test]
    fn no_hits_falls_through_to_default() {
        let best = best_match("xyz qrs");
        assert_eq!(best.category, DEFAULT_CATEGORY);
        assert!(best.keywords.is_empty());
    }

    #[test]
    fn tie_goes_to_earliest_category() {
        // One private-hospital hit ("clinic") and one NGO hit ("trust")
        let best = best_match("A clinic run by a trust");
        assert_eq!(best.category, Category::PrivateHospital);
    }

    #[test]
    fn funder_keywords_win_for_foundations() {
        let best = best_match("A philanthropic foundation offering grants for maternal health");
        assert_eq!(best.category, Category::Funder);
        assert_eq!(best.keywords, vec!["foundation", "grants", "philanthropic"]);
    }

    #[test]
    fn phc_keywords() {
        let best = best_match("Primary Health Centre with ASHA workers covering 12 villages and the village sub-centre");
        assert_eq!(best.category, Category::Phc);
        assert!(best.keywords.contains(&"asha"));
    }

    #[test]
    fn hits_listed_for_every_category() {
        let hits = keyword_hits("anything");
        assert_eq!(hits.len(), Category::ALL.len());
        assert_eq!(hits[0].category, Category::PrivateHospital);
        assert_eq!(hits[6].category, Category::Funder);
    }
}
