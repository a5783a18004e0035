//! # Pipeline
//!
//! The human-gated sequential pipeline: a fixed three-stage plan, a
//! runner that executes it on a background task, and the events it
//! publishes to the chat surface.

pub mod events;
pub mod runner;
pub mod stage;

pub use events::{PipelineEvent, PipelineEventKind};
pub use runner::{run_analysis, AnalysisResult, Runner, RunnerConfig, StageExecutor};
pub use stage::{analysis_plan, AnalysisStage, Progress, StageResult, StageSpec};
