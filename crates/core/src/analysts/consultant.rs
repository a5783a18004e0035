//! # Business Plan Skill
//!
//! Final analyst in the crew. Synthesizes the marketing and technology
//! reports into the aggregate business plan, in the mandated format.

use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::ModelConfig;
use crate::run_llm_function;

/// Output from the business plan skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct BusinessPlan {
    /// The marketing report in full, with the consultant's own thoughts
    pub marketing_report: String,
    /// The technology report in full, with the consultant's own thoughts
    pub technology_report: String,
    /// How to make a sustainable and profitable business (>= 10 points)
    pub business_model: Vec<String>,
    /// Scalability strategies (>= 5 points)
    pub scalability_strategies: Vec<String>,
    /// Potential revenue streams (5 points)
    pub revenue_streams: Vec<String>,
    /// Time schedule of 5 goals
    pub goals: Vec<String>,
}

impl BusinessPlan {
    /// Render the plan for the chat surface, in the mandated section order.
    pub fn to_markdown(&self) -> String {
        let bullets = |items: &[String]| {
            items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "## Business Plan\n\n\
             ### Marketing Report\n{}\n\n\
             ### Technological Report\n{}\n\n\
             ### Business Model\n{}\n\n\
             ### Scalability Strategies\n{}\n\n\
             ### Potential Revenue Streams\n{}\n\n\
             ### Goals\n{}\n",
            self.marketing_report,
            self.technology_report,
            bullets(&self.business_model),
            bullets(&self.scalability_strategies),
            bullets(&self.revenue_streams),
            bullets(&self.goals)
        )
    }
}

/// Business plan skill
pub struct BusinessPlanSkill;

impl BusinessPlanSkill {
    /// Run the skill against the stage input (which carries both prior
    /// reports).
    pub async fn run(input: &str, config: &ModelConfig) -> anyhow::Result<BusinessPlan> {
        run_llm_function!(config, BusinessPlan, SYSTEM_PROMPT, input.to_string())
    }
}

const SYSTEM_PROMPT: &str = include_str!("defaults/business_consultant.md");

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> BusinessPlan {
        BusinessPlan {
            marketing_report: "strong demand among clinics".to_string(),
            technology_report: "RAG over patient-facing FAQs".to_string(),
            business_model: vec!["subscription per seat".to_string()],
            scalability_strategies: vec!["self-serve onboarding".to_string()],
            revenue_streams: vec!["consulting retainers".to_string()],
            goals: vec!["Q1: first 10 paying clinics".to_string()],
        }
    }

    #[test]
    fn test_markdown_keeps_mandated_section_order() {
        let md = sample_plan().to_markdown();
        let marketing = md.find("### Marketing Report").unwrap();
        let technology = md.find("### Technological Report").unwrap();
        let model = md.find("### Business Model").unwrap();
        let scalability = md.find("### Scalability Strategies").unwrap();
        let revenue = md.find("### Potential Revenue Streams").unwrap();
        let goals = md.find("### Goals").unwrap();
        assert!(marketing < technology);
        assert!(technology < model);
        assert!(model < scalability);
        assert!(scalability < revenue);
        assert!(revenue < goals);
    }

    #[test]
    fn test_markdown_carries_both_reports() {
        let md = sample_plan().to_markdown();
        assert!(md.contains("strong demand among clinics"));
        assert!(md.contains("RAG over patient-facing FAQs"));
        assert!(md.contains("- subscription per seat"));
    }
}
