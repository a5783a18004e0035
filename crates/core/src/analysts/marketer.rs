//! # Market Research Skill
//!
//! First analyst in the crew. Sizes demand and audience for the topic,
//! grounded by live web search.

use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysts::tools::search_tools;
use crate::models::ModelConfig;
use crate::run_llm_worker;

/// Output from the market research skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct MarketReport {
    /// Bullet points covering the most important marketing considerations
    pub findings: Vec<String>,
    /// Profile of the ideal customer
    pub ideal_customer: String,
    /// How to reach the widest possible audience
    pub reach_strategy: String,
    /// One-paragraph summary
    pub summary: String,
}

impl MarketReport {
    /// Render the report for the chat surface.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Market Research Report\n\n### Findings\n");
        for finding in &self.findings {
            out.push_str(&format!("- {finding}\n"));
        }
        out.push_str(&format!(
            "\n### Ideal Customer\n{}\n\n### Reach Strategy\n{}\n\n### Summary\n{}\n",
            self.ideal_customer, self.reach_strategy, self.summary
        ));
        out
    }
}

/// Market research skill
pub struct MarketResearchSkill;

impl MarketResearchSkill {
    /// Run the skill against the stage input.
    pub async fn run(input: &str, config: &ModelConfig) -> anyhow::Result<MarketReport> {
        run_llm_worker!(
            config,
            MarketReport,
            SYSTEM_PROMPT,
            input.to_string(),
            search_tools::search_web,
        )
    }
}

const SYSTEM_PROMPT: &str = include_str!("defaults/marketer.md");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_rendering_keeps_section_order() {
        let report = MarketReport {
            findings: vec!["strong SMB demand".to_string(), "low churn".to_string()],
            ideal_customer: "mid-market ops teams".to_string(),
            reach_strategy: "partner webinars".to_string(),
            summary: "demand is real".to_string(),
        };
        let md = report.to_markdown();
        let findings = md.find("strong SMB demand").unwrap();
        let customer = md.find("mid-market ops teams").unwrap();
        let summary = md.find("demand is real").unwrap();
        assert!(findings < customer && customer < summary);
        assert!(md.contains("- low churn"));
    }

    #[test]
    fn test_system_prompt_bundled() {
        assert!(SYSTEM_PROMPT.contains("Market Research Analyst"));
    }
}
