//! Provider-agnostic text generation seam.
//!
//! The guided-answer pipeline talks to [`TextGenerator`] only; [`LlmService`]
//! is the production implementation that routes to the configured provider.
//! Tests substitute a scripted mock, which keeps every stage's generation
//! call observable (call counts, canned replies) without any network.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::LlmError,
    services::{anthropic_service::AnthropicService, ollama_service::OllamaService},
};

/// Per-request generation knobs.
///
/// Any `None` falls back to the value in [`LlmModelConfig`]. The pipeline
/// uses different token budgets per stage (e.g., 500 for classification,
/// 2000 for synthesis), so these travel with the call rather than the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenOptions {
    /// Maximum number of tokens to generate for this call.
    pub max_tokens: Option<u32>,
    /// Sampling temperature for this call.
    pub temperature: Option<f32>,
}

impl GenOptions {
    /// Convenience constructor for the common "bounded output" case.
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            temperature: None,
        }
    }
}

/// Stateless request/response text generation.
///
/// The contract does not guarantee well-formed structured output; callers
/// must defensively parse the returned text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for `prompt` with per-call `opts`.
    ///
    /// # Errors
    /// Returns [`LlmError`] on transport failures, non-2xx statuses, or
    /// undecodable provider payloads.
    async fn generate(&self, prompt: &str, opts: GenOptions) -> Result<String, LlmError>;
}

/// Production [`TextGenerator`] routing to the configured provider.
///
/// Construct once, wrap in `Arc`, and pass clones to dependents. The
/// underlying HTTP client is created eagerly so misconfiguration surfaces
/// at startup, not on the first request.
pub struct LlmService {
    cfg: LlmModelConfig,
    backend: Backend,
}

enum Backend {
    Ollama(Arc<OllamaService>),
    Anthropic(Arc<AnthropicService>),
}

impl LlmService {
    /// Creates a service for the provider named in `cfg`.
    ///
    /// # Errors
    /// Propagates provider constructor errors (bad endpoint, missing key).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        let backend = match cfg.provider {
            LlmProvider::Ollama => Backend::Ollama(Arc::new(OllamaService::new(cfg.clone())?)),
            LlmProvider::Anthropic => {
                Backend::Anthropic(Arc::new(AnthropicService::new(cfg.clone())?))
            }
        };

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "LlmService initialized"
        );

        Ok(Self { cfg, backend })
    }

    /// Returns the active model config.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, opts: GenOptions) -> Result<String, LlmError> {
        match &self.backend {
            Backend::Ollama(cli) => cli.generate(prompt, opts).await,
            Backend::Anthropic(cli) => cli.generate(prompt, opts).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_exposes_the_active_config() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "qwen3:14b".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: Some(256),
            temperature: Some(0.7),
            timeout_secs: Some(5),
        };

        let svc = LlmService::new(cfg.clone()).unwrap();
        assert_eq!(svc.config(), &cfg);
    }
}
