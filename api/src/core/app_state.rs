use std::sync::Arc;

use gita_store::JsonVerseStore;
use guide_pipeline::GuidePipeline;
use llm_service::config::default_config::config_from_env;
use llm_service::{HealthService, LlmModelConfig, LlmService};

use crate::error_handler::AppError;
use crate::middleware_layer::rate_limit::{AdmissionControl, FixedWindowLimiter};

const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// The guided-answer pipeline, wired to the configured provider and corpus.
    pub pipeline: GuidePipeline,
    /// Admission control for the guide route.
    pub limiter: Arc<dyn AdmissionControl>,
    /// Provider health prober backing `/health`.
    pub health: HealthService,
    /// The active model config (the health probe needs it per call).
    pub llm_config: LlmModelConfig,
}

impl AppState {
    /// Loads shared state from environment variables.
    ///
    /// The corpus file and the provider client are both built eagerly so a
    /// misconfigured deployment fails at startup, not on the first request.
    ///
    /// # Errors
    /// Returns [`AppError`] for missing variables, an unreadable corpus, or
    /// a provider config/client problem.
    pub fn from_env() -> Result<Self, AppError> {
        let cfg = config_from_env().map_err(|e| AppError::Startup(e.to_string()))?;
        let llm = LlmService::new(cfg).map_err(|e| AppError::Startup(e.to_string()))?;
        let llm_config = llm.config().clone();

        let corpus_path =
            std::env::var("GITA_CORPUS_PATH").map_err(|_| AppError::MissingEnv("GITA_CORPUS_PATH"))?;
        let store =
            JsonVerseStore::load(&corpus_path).map_err(|e| AppError::Startup(e.to_string()))?;

        let quota = match std::env::var("RATE_LIMIT_PER_MINUTE") {
            Ok(v) if !v.trim().is_empty() => v.trim().parse::<u32>().map_err(|_| {
                AppError::Startup("RATE_LIMIT_PER_MINUTE must be a positive integer".into())
            })?,
            _ => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        let health = HealthService::new(llm_config.timeout_secs)
            .map_err(|e| AppError::Startup(e.to_string()))?;

        Ok(Self {
            pipeline: GuidePipeline::new(Arc::new(llm), Arc::new(store)),
            limiter: Arc::new(FixedWindowLimiter::per_minute(quota)),
            health,
            llm_config,
        })
    }
}
