//! # Pipeline Runner
//!
//! Drives the analyst crew over a topic, one stage at a time, on a
//! background task. Stage results are published to the event channel the
//! moment they land, before the next stage starts. A failure anywhere is
//! caught, surfaced as an event, and releases the session gate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::analysts::AnalystRole;
use crate::models::ModelConfig;
use crate::session::Session;

use super::events::{PipelineEvent, PipelineEventKind};
use super::stage::{analysis_plan, Progress, StageResult, StageSpec};

/// Configuration for the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Model used by every analyst unless overridden
    pub model: ModelConfig,
    /// Per-analyst model overrides (analyst slug -> model name)
    #[serde(default)]
    pub per_analyst_models: HashMap<String, String>,
    /// Revision rounds the technologist grants the human reviewer
    pub max_revisions: u32,
    /// Ceiling on a single analyst call
    pub stage_timeout: Duration,
    /// Ceiling on a single wait for a human reply
    pub human_input_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            per_analyst_models: HashMap::new(),
            max_revisions: 3,
            stage_timeout: Duration::from_secs(600),
            human_input_timeout: Duration::from_secs(900),
        }
    }
}

impl RunnerConfig {
    /// Model config for a specific analyst: per-analyst override, then global.
    pub fn model_for(&self, analyst: AnalystRole) -> ModelConfig {
        let mut config = self.model.clone();
        if let Some(model) = self.per_analyst_models.get(analyst.slug()) {
            config.model = model.clone();
        }
        config
    }
}

/// The collaborator the runner dispatches stages to.
///
/// The production implementation routes each stage to its analyst skill
/// (LLM calls, tool use, the human-review loop); tests substitute a
/// scripted one.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn execute(&self, stage: &StageSpec, input: &str) -> Result<String>;
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// The topic the run was started with
    pub topic: String,
    /// One result per stage, in stage order
    pub stages: Vec<StageResult>,
    /// The aggregate report (the consultant's business plan)
    pub report: String,
}

/// The pipeline runner
pub struct Runner {
    config: RunnerConfig,
    executor: Arc<dyn StageExecutor>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
    progress: Progress,
}

impl Runner {
    /// Create a new runner over an executor
    pub fn new(config: RunnerConfig, executor: Arc<dyn StageExecutor>) -> Self {
        Self {
            config,
            executor,
            event_tx: None,
            progress: Progress::new(),
        }
    }

    /// Set event channel for streaming progress to the chat surface
    pub fn with_event_channel(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Current stage of the run
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Emit an event
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Run the crew on a topic.
    ///
    /// Invoked at most once per runner. Failures are reported as a
    /// `PipelineFailed` event before the error propagates.
    #[tracing::instrument(skip(self), fields(topic = %topic))]
    pub async fn run(&mut self, topic: &str) -> Result<AnalysisResult> {
        match self.run_stages(topic).await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.progress.fail();
                self.emit(
                    PipelineEvent::new(PipelineEventKind::PipelineFailed, "system")
                        .with_text(format!("The analysis failed: {e:#}. Send a new topic to try again.")),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self, topic: &str) -> Result<AnalysisResult> {
        self.emit(
            PipelineEvent::new(PipelineEventKind::PipelineStarted, "system")
                .with_text(format!("Starting the analyst crew on \"{topic}\"."))
                .with_data(serde_json::json!({ "topic": topic })),
        )
        .await;

        let plan = analysis_plan(topic);
        let mut results: Vec<StageResult> = Vec::with_capacity(plan.len());

        for stage in &plan {
            self.emit(
                PipelineEvent::new(PipelineEventKind::StageStarted, stage.analyst.slug())
                    .with_text(stage.description.clone()),
            )
            .await;

            let input = stage.compose_input(&results);
            let output = tokio::time::timeout(
                self.config.stage_timeout,
                self.executor.execute(stage, &input),
            )
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "the {} did not answer within {:?}",
                    stage.analyst.role_title(),
                    self.config.stage_timeout
                )
            })?
            .with_context(|| format!("{} stage failed", stage.analyst.display_name()))?;

            results.push(StageResult {
                analyst: stage.analyst,
                output: output.clone(),
            });

            // Published before the next stage starts: results stream in
            // one by one rather than arriving as a batch at the end.
            self.emit(
                PipelineEvent::new(PipelineEventKind::StageCompleted, stage.analyst.slug())
                    .with_text(output),
            )
            .await;

            self.progress.advance();
        }

        let report = results
            .last()
            .map(|r| r.output.clone())
            .unwrap_or_default();

        self.emit(
            PipelineEvent::new(PipelineEventKind::PipelineCompleted, "assistant")
                .with_text(format!("## Final Result\n{report}")),
        )
        .await;

        Ok(AnalysisResult {
            topic: topic.to_string(),
            stages: results,
            report,
        })
    }
}

/// Drive one run and settle the session gate by its outcome: a success
/// closes the session for good, a failure reopens the gate so the next
/// message can start a fresh run.
pub async fn run_analysis(
    session: &Session,
    runner: &mut Runner,
    topic: &str,
) -> Result<AnalysisResult> {
    match runner.run(topic).await {
        Ok(result) => {
            session.finish();
            Ok(result)
        }
        Err(e) => {
            session.release();
            Err(e)
        }
    }
}
