//! Category-keyed outreach email templates.

use tracing::{debug, warn};

use crate::types::category::Category;
use crate::types::results::{EmailDraft, Provenance};

pub const HOSPITAL_NAME: &str = "[Hospital Name]";
pub const ORGANIZATION_NAME: &str = "[Organization Name]";
pub const FUNDER_NAME: &str = "[Funder Name]";
pub const DISTRICT: &str = "[District]";

/// Every placeholder a template may contain.
pub const PLACEHOLDERS: &[&str] = &[HOSPITAL_NAME, ORGANIZATION_NAME, FUNDER_NAME, DISTRICT];

/// Used for categories without a template of their own.
pub const DEFAULT_TEMPLATE: Category = Category::PrivateHospital;

/// Subject and body with placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: &'static str,
    pub body: &'static str,
}

static PRIVATE_HOSPITAL: EmailTemplate = EmailTemplate {
    subject: "Partnership Opportunity: Maternal Health Outreach Program – MotherSource AI",
    body: "Dear [Hospital Name] Team,

I hope this message finds you well. I am writing on behalf of MotherSource AI, a maternal health intelligence platform focused on improving maternal outcomes across Andhra Pradesh and Telangana.

We have identified [Hospital Name] as a leading healthcare institution with exceptional maternal care capabilities in [District]. Your commitment to women's health aligns perfectly with our mission to reduce maternal mortality in the region.

We would love to explore a partnership that includes:
• Integration with our maternal health tracking platform
• Participation in our community outreach network
• Access to our AI-powered patient referral system
• Joint training programs for maternal health staff

Our platform currently works with 47+ healthcare entities across AP and Telangana, and we believe [Hospital Name] would be an invaluable partner in our mission.

Would you be available for a 30-minute call this week to discuss this opportunity further?

Warm regards,
MotherSource AI Team
maternal@mothersource.ai | www.mothersource.ai",
};

static NGO: EmailTemplate = EmailTemplate {
    subject: "Collaboration Opportunity: Maternal Health Program Partnership – MotherSource AI",
    body: "Dear [Organization Name] Team,

Greetings from MotherSource AI!

We are reaching out to explore a meaningful collaboration with [Organization Name] on maternal health initiatives across Andhra Pradesh and Telangana.

Your organization's work in maternal health and community outreach closely aligns with our AI-powered platform that helps identify, connect, and scale maternal health programs across the region.

We propose the following areas of collaboration:
• Co-designing community outreach programs
• Sharing data insights for program improvement
• Joint funding applications for maternal health grants
• Capacity building through our AI-powered tools

We have successfully matched NGOs with maternal health programs resulting in 40% improved reach and outcomes. We believe [Organization Name]'s grassroots expertise combined with our technology can create significant impact.

Let's schedule a call to discuss how we can work together.

With warm regards,
MotherSource AI Partnership Team
partners@mothersource.ai",
};

static FUNDER: EmailTemplate = EmailTemplate {
    subject: "Grant Proposal: AI-Powered Maternal Health Outreach – AP & Telangana",
    body: "Dear [Funder Name] Team,

I am writing to present an exciting funding opportunity in maternal health innovation for Andhra Pradesh and Telangana.

MotherSource AI is an AI-powered maternal health intelligence platform that helps organizations discover outreach channels, identify NGO partners, and connect with funding opportunities, specifically focused on reducing maternal mortality in AP and Telangana.

Project Overview:
• Scope: 13 districts in AP + 33 districts in Telangana
• Impact: Connecting 50+ healthcare entities with maternal health programs
• Technology: AI classification, embeddings-based matching, priority scoring
• Timeline: 18-month pilot with measurable outcomes

Expected Outcomes:
✓ 30% improvement in maternal health program reach
✓ 500+ healthcare providers onboarded
✓ 25+ NGO-program partnerships facilitated
✓ Real-time maternal health data for policy makers

We believe this aligns perfectly with [Funder Name]'s focus on maternal health and innovation in South India.

We would welcome the opportunity to present a full proposal. Could we schedule a discovery call?

Thank you for your consideration.

Sincerely,
MotherSource AI Team
grants@mothersource.ai | www.mothersource.ai",
};

static GOVERNMENT_HOSPITAL: EmailTemplate = EmailTemplate {
    subject: "Digital Health Partnership: Maternal Health Intelligence Platform – MotherSource AI",
    body: "Dear Director/Medical Superintendent,

I am writing to introduce MotherSource AI, a maternal health intelligence platform designed to support government health institutions in Andhra Pradesh and Telangana.

[Hospital Name] has been identified as a critical node in the maternal health ecosystem of [District]. We would like to offer our platform to support your maternal health programs at no cost during our pilot phase.

Our platform offers:
• Real-time maternal health data analytics
• Integration with NHM and JSSK schemes
• Community health worker coordination tools
• Referral network management
• Maternal mortality audit support

We are committed to supporting the government's goal of reducing maternal mortality ratio (MMR) in AP and Telangana, and we believe a partnership with [Hospital Name] would be a significant step toward this goal.

We would be honored to present our platform to your team at your convenience.

Respectfully,
MotherSource AI Team
govt@mothersource.ai",
};

/// Template table. Categories missing here render with `DEFAULT_TEMPLATE`.
pub fn template_for(category: Category) -> Option<&'static EmailTemplate> {
    match category {
        Category::PrivateHospital => Some(&PRIVATE_HOSPITAL),
        Category::GovernmentHospital => Some(&GOVERNMENT_HOSPITAL),
        Category::Ngo => Some(&NGO),
        Category::Funder => Some(&FUNDER),
        Category::MedicalCollege | Category::Phc | Category::Corporate => None,
    }
}

/// Categories with a dedicated template.
pub fn template_keys() -> Vec<Category> {
    Category::ALL
        .iter()
        .copied()
        .filter(|c| template_for(*c).is_some())
        .collect()
}

/// Known placeholders still present in `text`.
pub fn unresolved_placeholders(text: &str) -> Vec<&'static str> {
    PLACEHOLDERS
        .iter()
        .copied()
        .filter(|p| text.contains(p))
        .collect()
}

/// Replace every known placeholder in one left-to-right pass.
///
/// Substituted values are never rescanned, so a name containing a
/// placeholder literal cannot trigger a second substitution.
fn substitute(template: &str, organization_name: &str, district: &str) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('[') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let replacement = PLACEHOLDERS
            .iter()
            .find(|p| candidate.starts_with(*p))
            .map(|p| (*p, if *p == DISTRICT { district } else { organization_name }));

        match replacement {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &candidate[placeholder.len()..];
            }
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders category templates into drafts.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    default_district: String,
}

impl TemplateEngine {
    pub fn new(default_district: impl Into<String>) -> Self {
        Self {
            default_district: default_district.into(),
        }
    }

    pub fn default_district(&self) -> &str {
        &self.default_district
    }

    /// Render the template for `category`.
    ///
    /// Total and idempotent. A blank district renders as the default district.
    pub fn render(&self, category: Category, organization_name: &str, district: &str) -> EmailDraft {
        let template = template_for(category).unwrap_or_else(|| {
            debug!(category = %category, fallback = %DEFAULT_TEMPLATE, "No template for category, using default");
            &PRIVATE_HOSPITAL
        });

        let organization_name = organization_name.trim();
        let district = match district.trim() {
            "" => self.default_district.as_str(),
            d => d,
        };

        let subject = substitute(template.subject, organization_name, district);
        let body = substitute(template.body, organization_name, district);

        let leftover = unresolved_placeholders(&format!("{}\n{}", subject, body));
        if !leftover.is_empty() {
            warn!(category = %category, placeholders = ?leftover, "Rendered template still has placeholders");
        }

        EmailDraft::new(subject, body, Provenance::Fallback)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new("Andhra Pradesh")
    }
}
