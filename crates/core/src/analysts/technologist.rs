//! # Technology Assessment Skill
//!
//! Second analyst in the crew. Assesses feasibility and the stack to
//! adopt; the draft is held for human review before it becomes final.

use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::bridge::HumanInputProvider;
use crate::models::ModelConfig;
use crate::run_llm_function;

/// Output from the technology assessment skill
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct TechnologyReport {
    /// Technologies the business needs, one point each, with the why
    pub recommendations: Vec<String>,
    /// Adoption order and first milestone
    pub adoption_plan: String,
    /// One-paragraph summary
    pub summary: String,
}

impl TechnologyReport {
    /// Render the report for the chat surface.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Technology Assessment\n\n### Recommendations\n");
        for recommendation in &self.recommendations {
            out.push_str(&format!("- {recommendation}\n"));
        }
        out.push_str(&format!(
            "\n### Adoption Plan\n{}\n\n### Summary\n{}\n",
            self.adoption_plan, self.summary
        ));
        out
    }
}

/// Technology assessment skill
pub struct TechnologyAssessmentSkill;

impl TechnologyAssessmentSkill {
    /// Run the skill once, without the review loop.
    pub async fn run(input: &str, config: &ModelConfig) -> anyhow::Result<TechnologyReport> {
        run_llm_function!(config, TechnologyReport, SYSTEM_PROMPT, input.to_string())
    }

    /// Draft, then hold the draft for human review.
    ///
    /// A reply that is not an approval is treated as revision feedback and
    /// folded into the next draft. After `max_revisions` rounds the latest
    /// draft stands, so an unsatisfiable reviewer cannot wedge the run.
    pub async fn run_with_review(
        input: &str,
        human: &dyn HumanInputProvider,
        config: &ModelConfig,
        max_revisions: u32,
    ) -> anyhow::Result<TechnologyReport> {
        let mut report = Self::run(input, config).await?;

        for round in 0..max_revisions {
            let reply = human.ask(&review_prompt(&report.to_markdown())).await?;
            if is_approval(&reply) {
                return Ok(report);
            }

            tracing::info!(round, "revising technology assessment from human feedback");
            let revision_input = format!(
                "{input}\n\nYour previous draft:\n{}\n\nHuman feedback to address:\n{reply}",
                report.to_markdown()
            );
            report = Self::run(&revision_input, config).await?;
        }

        tracing::warn!("revision budget exhausted, keeping the latest draft");
        Ok(report)
    }
}

/// The prompt shown to the human next to the analyst's draft.
fn review_prompt(draft: &str) -> String {
    format!(
        "Here is my draft technology assessment:\n\n{draft}\n\nReply \"Approved, please \
         proceed.\" to accept it, or describe what should change."
    )
}

/// Whether a human reply accepts the draft.
pub(crate) fn is_approval(reply: &str) -> bool {
    let reply = reply.trim().to_ascii_lowercase();
    ["approved", "approve", "looks good", "lgtm", "yes"]
        .iter()
        .any(|word| reply.starts_with(word))
}

const SYSTEM_PROMPT: &str = include_str!("defaults/technologist.md");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_detection() {
        assert!(is_approval("Approved, please proceed."));
        assert!(is_approval("  approve"));
        assert!(is_approval("LGTM"));
        assert!(is_approval("looks good to me"));
        assert!(is_approval("Yes"));
    }

    #[test]
    fn test_feedback_is_not_approval() {
        assert!(!is_approval("Try again."));
        assert!(!is_approval("Please add a point about data privacy"));
        assert!(!is_approval(""));
    }

    #[test]
    fn test_review_prompt_carries_the_draft() {
        let prompt = review_prompt("## Technology Assessment\n- use RAG");
        assert!(prompt.contains("use RAG"));
        assert!(prompt.contains("Approved, please proceed."));
    }

    #[test]
    fn test_markdown_rendering() {
        let report = TechnologyReport {
            recommendations: vec!["vector database for retrieval".to_string()],
            adoption_plan: "retrieval first".to_string(),
            summary: "feasible".to_string(),
        };
        let md = report.to_markdown();
        assert!(md.contains("- vector database for retrieval"));
        assert!(md.contains("### Adoption Plan"));
    }
}
