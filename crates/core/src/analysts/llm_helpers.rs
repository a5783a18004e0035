//! # LLM Helpers
//!
//! Provider dispatch for the analyst skills. The provider matching lives
//! in one macro; the function/worker wrappers build on it.

/// Macro that resolves a [`crate::models::ModelConfig`] into a concrete
/// provider client and runs `$body` with it bound to `$llm`.
#[macro_export]
macro_rules! with_provider_llm {
    ($config:expr, $llm:ident => $body:expr) => {{
        use radkit::models::providers::{
            AnthropicLlm, DeepSeekLlm, GeminiLlm, GrokLlm, OpenAILlm, OpenRouterLlm,
        };
        use $crate::models::LlmProvider;

        let config = $config;
        match config.provider {
            LlmProvider::Anthropic => {
                let $llm = AnthropicLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::OpenAI => {
                let mut llm = OpenAILlm::from_env(&config.model)?;
                if let Some(base_url) = &config.base_url {
                    llm = llm.with_base_url(base_url);
                }
                let $llm = llm;
                $body
            }
            LlmProvider::Gemini => {
                let $llm = GeminiLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::OpenRouter => {
                let $llm = OpenRouterLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::Grok => {
                let $llm = GrokLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::DeepSeek => {
                let $llm = DeepSeekLlm::from_env(&config.model)?;
                $body
            }
        }
    }};
}

/// Run a plain `LlmFunction` (no tools) against any provider.
#[macro_export]
macro_rules! run_llm_function {
    ($config:expr, $output_type:ty, $system_prompt:expr, $input:expr) => {{
        use radkit::agent::LlmFunction;

        let result: anyhow::Result<$output_type> = $crate::with_provider_llm!($config, llm => {
            let func =
                LlmFunction::<$output_type>::new_with_system_instructions(llm, $system_prompt);
            func.run($input).await.map_err(Into::into)
        });
        result
    }};
}

/// Run an `LlmWorker` with tools against any provider. Use this for
/// skills that search the web.
#[macro_export]
macro_rules! run_llm_worker {
    ($config:expr, $output_type:ty, $system_prompt:expr, $input:expr, $($tool:expr),* $(,)?) => {{
        use radkit::agent::LlmWorker;

        let result: anyhow::Result<$output_type> = $crate::with_provider_llm!($config, llm => {
            let worker = LlmWorker::<$output_type>::builder(llm)
                .with_system_instructions($system_prompt)
                $(.with_tool($tool))*
                .build();
            worker.run($input).await.map_err(Into::into)
        });
        result
    }};
}

pub use {run_llm_function, run_llm_worker, with_provider_llm};
