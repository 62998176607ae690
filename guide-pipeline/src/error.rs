//! Typed error for the guide-pipeline crate.

use gita_store::StoreError;
use llm_service::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed caller input; never reaches the stages.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A generation reply did not match the expected structured shape in a
    /// stage with no local fallback.
    #[error("{stage} returned a malformed reply: {detail}")]
    MalformedReply {
        /// Human name of the failing stage (e.g., "Understand Intent").
        stage: &'static str,
        /// Parser detail, safe to log but not to show verbatim to end users.
        detail: String,
    },

    /// The generation call itself failed (network/timeout/provider error).
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The verse store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
