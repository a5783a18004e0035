//! # Analysis Stages
//!
//! The fixed three-stage analysis plan and its progress state machine.

use serde::{Deserialize, Serialize};

use crate::analysts::AnalystRole;

/// One scripted unit of work for one analyst.
///
/// Stages are immutable once built; the plan order never changes at
/// runtime.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The analyst that executes this stage
    pub analyst: AnalystRole,
    /// What the analyst is asked to do (topic already interpolated)
    pub description: String,
    /// What a good answer looks like
    pub expected_output: String,
    /// Whether the draft is held for human approval before finalizing
    pub human_review: bool,
}

impl StageSpec {
    /// Compose the full stage input from the description, the expected
    /// output and the results of the stages that already ran.
    pub fn compose_input(&self, prior: &[StageResult]) -> String {
        let mut input = format!(
            "{}\n\nExpected output:\n{}",
            self.description, self.expected_output
        );
        for result in prior {
            input.push_str(&format!(
                "\n\n--- Report from the {} ---\n{}",
                result.analyst.role_title(),
                result.output
            ));
        }
        input
    }
}

/// Output of one executed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// The analyst that produced it
    pub analyst: AnalystRole,
    /// The rendered report text
    pub output: String,
}

/// Build the fixed plan for a topic: marketing, then technology (human
/// gated), then the synthesized business plan.
pub fn analysis_plan(topic: &str) -> Vec<StageSpec> {
    vec![
        StageSpec {
            analyst: AnalystRole::Marketer,
            description: format!(
                "Analyze the market demand for GenAI agents, LLMs, embeddings and GenAI \
                 solutions in the {topic} industry. Find out what the ideal customer might \
                 look like and how to reach the widest possible audience."
            ),
            expected_output: "A concise report with at least 10 bullet points addressing the \
                              most important areas when it comes to marketing this type of \
                              business."
                .to_string(),
            human_review: false,
        },
        StageSpec {
            analyst: AnalystRole::Technologist,
            description: "Analyze how to create systems that leverage LLMs for many use cases, \
                          including retrieval augmented generation, data parsing, data \
                          generation, decision making and analysis, with a description of which \
                          technologies the business needs to adopt in order to deliver GenAI to \
                          its customers."
                .to_string(),
            expected_output: "A detailed report with at least 10 bullet points describing which \
                              technologies the business needs to use in order to implement \
                              GenAI for customers. Check with a human that your assessment is \
                              good before finalizing your answer."
                .to_string(),
            human_review: true,
        },
        StageSpec {
            analyst: AnalystRole::BusinessConsultant,
            description: "Analyze and summarize the marketing and technology reports into a \
                          business plan."
                .to_string(),
            expected_output: "A detailed business plan describing how to build a sustainable \
                              and profitable business from the marketing and technology \
                              reports, with the marketing report and the technology report \
                              restated alongside your own thoughts, a business model of at \
                              least 10 concise points, at least 5 scalability strategies, \
                              5 potential revenue streams, and a time schedule for 5 goals."
                .to_string(),
            human_review: false,
        },
    ]
}

/// Progress through the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Marketer sizing demand and audience
    Marketing,
    /// Technologist assessing feasibility (human gated)
    Technology,
    /// Consultant synthesizing the business plan
    BusinessPlan,
    /// Complete
    Complete,
    /// Failed
    Failed,
}

/// The stage-order state machine
#[derive(Debug, Clone)]
pub struct Progress {
    /// Current stage
    pub stage: AnalysisStage,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            stage: AnalysisStage::Marketing,
        }
    }
}

impl Progress {
    /// Create a new progress tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            AnalysisStage::Marketing => AnalysisStage::Technology,
            AnalysisStage::Technology => AnalysisStage::BusinessPlan,
            AnalysisStage::BusinessPlan => AnalysisStage::Complete,
            AnalysisStage::Complete => AnalysisStage::Complete,
            AnalysisStage::Failed => AnalysisStage::Failed,
        };
    }

    /// Fail the run
    pub fn fail(&mut self) {
        self.stage = AnalysisStage::Failed;
    }

    /// Check if the run is over
    pub fn is_complete(&self) -> bool {
        matches!(self.stage, AnalysisStage::Complete | AnalysisStage::Failed)
    }

    /// Check if the run succeeded
    pub fn is_success(&self) -> bool {
        self.stage == AnalysisStage::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_has_three_stages_in_crew_order() {
        let plan = analysis_plan("fintech");
        let roles: Vec<_> = plan.iter().map(|s| s.analyst).collect();
        assert_eq!(
            roles,
            vec![
                AnalystRole::Marketer,
                AnalystRole::Technologist,
                AnalystRole::BusinessConsultant,
            ]
        );
    }

    #[test]
    fn test_topic_is_interpolated_into_first_stage() {
        let plan = analysis_plan("fintech");
        assert!(plan[0].description.contains("fintech"));
    }

    #[test]
    fn test_only_technology_stage_is_human_gated() {
        let plan = analysis_plan("fintech");
        let gated: Vec<_> = plan.iter().map(|s| s.human_review).collect();
        assert_eq!(gated, vec![false, true, false]);
    }

    #[test]
    fn test_compose_input_carries_prior_reports() {
        let plan = analysis_plan("healthcare");
        let prior = vec![StageResult {
            analyst: AnalystRole::Marketer,
            output: "10 marketing findings".to_string(),
        }];
        let input = plan[1].compose_input(&prior);
        assert!(input.contains(&plan[1].description));
        assert!(input.contains("Market Research Analyst"));
        assert!(input.contains("10 marketing findings"));
    }

    #[test]
    fn test_progress_advance() {
        let mut progress = Progress::new();
        assert_eq!(progress.stage, AnalysisStage::Marketing);
        progress.advance();
        assert_eq!(progress.stage, AnalysisStage::Technology);
        progress.advance();
        assert_eq!(progress.stage, AnalysisStage::BusinessPlan);
        progress.advance();
        assert!(progress.is_complete());
        assert!(progress.is_success());
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut progress = Progress::new();
        progress.fail();
        progress.advance();
        assert_eq!(progress.stage, AnalysisStage::Failed);
        assert!(progress.is_complete());
        assert!(!progress.is_success());
    }
}
