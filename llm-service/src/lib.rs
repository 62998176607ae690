//! Shared LLM service for the Sage backend.
//!
//! Provides:
//! - Universal model configuration ([`config::llm_model_config::LlmModelConfig`])
//! - Providers: local Ollama and the Anthropic Messages API
//! - A provider-agnostic [`generator::TextGenerator`] trait used as the
//!   seam between the guided-answer pipeline and the actual backend
//! - Unified error handling ([`error_handler::LlmError`])
//! - Lightweight health probes for a `/health` endpoint

pub mod config;
pub mod error_handler;
pub mod generator;
pub mod health_service;
pub mod services;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::LlmError;
pub use generator::{GenOptions, LlmService, TextGenerator};
pub use health_service::{HealthService, HealthStatus};
