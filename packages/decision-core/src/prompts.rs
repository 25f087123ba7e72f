//! LLM prompts for the oracle-backed decision paths.

use sha2::{Digest, Sha256};

use crate::types::category::Category;
use crate::types::entity::EntityAttributes;

/// System prompt shared by every chat call.
pub const SYSTEM_PROMPT: &str =
    "You are an expert in Indian healthcare and maternal health organizations. Respond only with the requested JSON.";

/// Prompt for classifying an organization description.
pub const CLASSIFY_PROMPT: &str = r#"Classify the following organization description into ONE of these categories:
- PHC (Primary Health Centre)
- Government Hospital
- Private Hospital
- Medical College
- NGO
- Corporate
- Funder

Organization Description:
{description}

Output JSON:
{
  "type": "<category label exactly as listed above, without the parenthetical>",
  "confidence": <integer 0-100>,
  "reasoning": "<2-3 sentence explanation>"
}"#;

/// Prompt for scoring relevance to the maternal health pilot.
pub const SCORE_PROMPT: &str = r#"You are evaluating organizations for a maternal health outreach pilot in Andhra Pradesh and Telangana, India.

Score this organization's relevance for a maternal health partnership (0-100).

Organization Details:
- Name: {name}
- Type: {category}
- District: {district}
- State: {state}
- Description: {description}

Scoring Factors:
1. Maternal health services offered
2. Women-focused programs
3. Community outreach capability
4. Geographic alignment (AP/Telangana focus)
5. Scale and patient base

Output JSON:
{
  "score": <integer 0-100>,
  "reasoning": ["reason 1", "reason 2", "reason 3", "reason 4"]
}"#;

/// Prompt for writing a partnership outreach email.
pub const OUTREACH_PROMPT: &str = r#"Write a professional outreach email for a maternal health partnership.

Sender: MotherSource AI (maternal health intelligence platform for AP & Telangana)
Recipient: {organization} - {recipient_context}
District: {district}
Purpose: Partnership for maternal health outreach program in Andhra Pradesh and Telangana

Requirements:
- Professional and warm tone
- Mention specific value propositions
- Include clear call-to-action
- 3-4 bullet points of benefits
- Reference specific AP/Telangana context
- 250-350 words

Output JSON:
{
  "subject": "<email subject line>",
  "body": "<full email body with greeting, paragraphs, bullet points, and signature>"
}"#;

/// How the outreach prompt describes a recipient of each category.
pub fn recipient_context(category: Category) -> &'static str {
    match category {
        Category::PrivateHospital => "a private hospital specializing in women and children's health",
        Category::GovernmentHospital => "a government hospital serving the public",
        Category::MedicalCollege => "a medical college with hospital facilities",
        Category::Phc => "a primary health centre serving rural communities",
        Category::Ngo => "an NGO working on maternal and child health",
        Category::Funder => "a foundation/funder interested in maternal health programs",
        Category::Corporate => "a corporate entity with CSR programs in healthcare",
    }
}

/// Hash of every prompt template. Logged when an oracle is built so
/// results can be traced to the prompt revision that produced them.
pub fn prompt_version_hash() -> String {
    let mut hasher = Sha256::new();
    for prompt in [SYSTEM_PROMPT, CLASSIFY_PROMPT, SCORE_PROMPT, OUTREACH_PROMPT] {
        hasher.update(prompt.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

pub fn format_classify_prompt(description: &str) -> String {
    CLASSIFY_PROMPT.replace("{description}", description)
}

pub fn format_score_prompt(attributes: &EntityAttributes) -> String {
    let category = attributes
        .category
        .map(|c| c.as_str())
        .unwrap_or("Unknown");
    SCORE_PROMPT
        .replace("{name}", &attributes.name)
        .replace("{category}", category)
        .replace("{district}", or_unknown(&attributes.district))
        .replace("{state}", or_unknown(&attributes.state))
        .replace("{description}", &attributes.description)
}

pub fn format_outreach_prompt(organization: &str, category: Category, district: &str) -> String {
    OUTREACH_PROMPT
        .replace("{organization}", organization)
        .replace("{recipient_context}", recipient_context(category))
        .replace("{district}", district)
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_hash_is_consistent() {
        assert_eq!(prompt_version_hash(), prompt_version_hash());
        assert_eq!(prompt_version_hash().len(), 64);
    }

    #[test]
    fn test_format_score_prompt() {
        let attributes = EntityAttributes::new("Rainbow Hospitals")
            .with_category(Category::PrivateHospital)
            .with_location("Hyderabad", "")
            .with_description("Women and children's hospital");
        let prompt = format_score_prompt(&attributes);
        assert!(prompt.contains("- Name: Rainbow Hospitals"));
        assert!(prompt.contains("- Type: Private Hospital"));
        assert!(prompt.contains("- State: Unknown"));
        assert!(!prompt.contains("{description}"));
    }

    #[test]
    fn test_format_outreach_prompt_uses_category_context() {
        let prompt = format_outreach_prompt("Tenali PHC", Category::Phc, "Guntur");
        assert!(prompt.contains("Recipient: Tenali PHC - a primary health centre serving rural communities"));
        assert!(prompt.contains("District: Guntur"));
    }
}
