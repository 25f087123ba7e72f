//! Outreach email drafting: oracle-written first, template second.

use tracing::info;

use crate::error::{require_text, Result};
use crate::fallback::FallbackPolicy;
use crate::oracle::{Oracle, OracleEmail, OutreachRequest};
use crate::templates::TemplateEngine;
use crate::types::category::Category;
use crate::types::results::EmailDraft;

pub struct OutreachService<O: Oracle> {
    oracle: O,
    templates: TemplateEngine,
    policy: FallbackPolicy,
}

impl<O: Oracle> OutreachService<O> {
    pub fn new(oracle: O, templates: TemplateEngine, policy: FallbackPolicy) -> Self {
        Self {
            oracle,
            templates,
            policy,
        }
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    /// Draft an email for `organization_name`.
    ///
    /// A blank district uses the configured default. Blank organization
    /// names are rejected before the oracle is called.
    pub async fn generate(
        &self,
        organization_name: &str,
        category: Category,
        district: &str,
    ) -> Result<EmailDraft> {
        let organization_name = require_text("organization name", organization_name)?;
        let district = match district.trim() {
            "" => self.templates.default_district(),
            d => d,
        };

        let request = OutreachRequest {
            organization_name: organization_name.to_string(),
            category,
            district: district.to_string(),
        };

        let sourced = self
            .policy
            .run(
                "generate_outreach",
                async {
                    let raw = self.oracle.generate_outreach(&request).await?;
                    raw.validate()
                },
                || {
                    let draft = self.templates.render(category, organization_name, district);
                    OracleEmail::new(draft.subject, draft.body)
                },
            )
            .await;

        info!(
            organization = %organization_name,
            category = %category,
            provenance = %sourced.provenance,
            "Generated outreach draft"
        );

        let email = sourced.value;
        Ok(EmailDraft::new(email.subject, email.body, sourced.provenance))
    }

    /// Fresh draft for the same inputs. Any edits on a previous draft are discarded.
    pub async fn regenerate(
        &self,
        organization_name: &str,
        category: Category,
        district: &str,
    ) -> Result<EmailDraft> {
        self.generate(organization_name, category, district).await
    }
}
