//! # Foresight Core
//!
//! The analyst crew, the one-shot session gate, and the human-in-the-loop
//! plumbing between a chat surface and a blocking pipeline.
//!
//! ## Architecture
//!
//! - `session` - the run-once gate and message routing
//! - `mailbox` - single-slot handoff for human replies
//! - `bridge` - how a blocked analyst asks a human a question
//! - `pipeline` - the fixed three-stage plan, the runner, and its events
//! - `analysts` - the three persona skills and their LLM dispatch
//! - `models` - LLM provider configuration
//! - `config` - environment-driven startup configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use foresight_core::pipeline::{run_analysis, Runner, RunnerConfig};
//!
//! let mut runner = Runner::new(RunnerConfig::default(), executor);
//! let result = run_analysis(&session, &mut runner, "fintech").await?;
//! ```

pub mod analysts;
pub mod bridge;
pub mod config;
pub mod mailbox;
pub mod models;
pub mod pipeline;
pub mod session;
