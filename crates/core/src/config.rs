//! # Runtime Configuration
//!
//! Environment-driven configuration, resolved once at startup. Missing
//! credentials fail fast here, before any session exists.

use std::time::Duration;

use anyhow::{bail, Result};

use crate::models::ModelConfig;
use crate::pipeline::RunnerConfig;

/// Everything the server needs to run sessions.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub runner: RunnerConfig,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Fails when `SERPER_API_KEY` or the active provider's API key is
    /// absent; both are required before the first analysis can succeed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let model = ModelConfig::from_lookup(&get);

        if get("SERPER_API_KEY").filter(|key| !key.is_empty()).is_none() {
            bail!("SERPER_API_KEY is not set; get a free key at https://serper.dev");
        }

        let key_env = model.provider.api_key_env();
        if get(key_env).filter(|key| !key.is_empty()).is_none() {
            bail!(
                "{key_env} is not set but the {} provider is selected",
                model.provider.display_name()
            );
        }

        let mut runner = RunnerConfig {
            model,
            ..RunnerConfig::default()
        };
        if let Some(max) = get("FORESIGHT_MAX_REVISIONS").and_then(|v| v.parse().ok()) {
            runner.max_revisions = max;
        }
        if let Some(secs) = get("FORESIGHT_STAGE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            runner.stage_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = get("FORESIGHT_HUMAN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            runner.human_input_timeout = Duration::from_secs(secs);
        }

        Ok(Self { runner })
    }
}
