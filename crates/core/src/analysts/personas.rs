//! # Analyst Personas
//!
//! Role identity for the three scripted analysts, including the avatars
//! the chat surface shows next to their messages.

use serde::{Deserialize, Serialize};

/// The three analyst roles, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalystRole {
    Marketer,
    Technologist,
    BusinessConsultant,
}

impl AnalystRole {
    /// All roles in the order they run.
    pub fn all() -> [AnalystRole; 3] {
        [
            AnalystRole::Marketer,
            AnalystRole::Technologist,
            AnalystRole::BusinessConsultant,
        ]
    }

    /// Short name shown as the chat sender.
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalystRole::Marketer => "Marketer",
            AnalystRole::Technologist => "Technologist",
            AnalystRole::BusinessConsultant => "Business Consultant",
        }
    }

    /// Full professional title used in prompts.
    pub fn role_title(&self) -> &'static str {
        match self {
            AnalystRole::Marketer => "Market Research Analyst",
            AnalystRole::Technologist => "Technology Expert",
            AnalystRole::BusinessConsultant => "Business Development Consultant",
        }
    }

    /// Stable id for configuration keys and event payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            AnalystRole::Marketer => "marketer",
            AnalystRole::Technologist => "technologist",
            AnalystRole::BusinessConsultant => "business_consultant",
        }
    }

    /// Avatar shown in the chat widget.
    pub fn avatar_url(&self) -> &'static str {
        match self {
            AnalystRole::Marketer => "https://i.imgur.com/mkfOVyG.png",
            AnalystRole::Technologist => "https://i.imgur.com/XEusRS3.png",
            AnalystRole::BusinessConsultant => "https://i.imgur.com/9hslbDP.png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_run_in_fixed_order() {
        assert_eq!(
            AnalystRole::all(),
            [
                AnalystRole::Marketer,
                AnalystRole::Technologist,
                AnalystRole::BusinessConsultant,
            ]
        );
    }

    #[test]
    fn test_slugs_are_distinct() {
        let slugs: std::collections::HashSet<_> =
            AnalystRole::all().iter().map(|r| r.slug()).collect();
        assert_eq!(slugs.len(), 3);
    }

    #[test]
    fn test_serde_uses_slug_casing() {
        let json = serde_json::to_string(&AnalystRole::BusinessConsultant).unwrap();
        assert_eq!(json, "\"business_consultant\"");
    }
}
