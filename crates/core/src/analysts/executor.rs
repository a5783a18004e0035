//! # LLM Executor
//!
//! The collaborator the runner dispatches stages to: routes each stage
//! to its analyst skill, with the human-review capability injected at
//! construction time rather than patched in globally.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::analysts::{
    AnalystRole, BusinessPlanSkill, MarketResearchSkill, TechnologyAssessmentSkill,
};
use crate::bridge::HumanInputProvider;
use crate::pipeline::{RunnerConfig, StageExecutor, StageSpec};

/// Routes stages to the analyst skills.
pub struct LlmExecutor {
    config: RunnerConfig,
    human: Arc<dyn HumanInputProvider>,
}

impl LlmExecutor {
    pub fn new(config: RunnerConfig, human: Arc<dyn HumanInputProvider>) -> Self {
        Self { config, human }
    }
}

#[async_trait]
impl StageExecutor for LlmExecutor {
    async fn execute(&self, stage: &StageSpec, input: &str) -> Result<String> {
        let model = self.config.model_for(stage.analyst);
        match stage.analyst {
            AnalystRole::Marketer => {
                Ok(MarketResearchSkill::run(input, &model).await?.to_markdown())
            }
            AnalystRole::Technologist => {
                let report = if stage.human_review {
                    TechnologyAssessmentSkill::run_with_review(
                        input,
                        self.human.as_ref(),
                        &model,
                        self.config.max_revisions,
                    )
                    .await?
                } else {
                    TechnologyAssessmentSkill::run(input, &model).await?
                };
                Ok(report.to_markdown())
            }
            AnalystRole::BusinessConsultant => {
                Ok(BusinessPlanSkill::run(input, &model).await?.to_markdown())
            }
        }
    }
}
