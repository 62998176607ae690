//! GET /health — probes the configured generation provider.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

/// Response payload for /health.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// "ok" when the provider answered the probe, "unreachable" otherwise.
    pub status: &'static str,
    pub provider: String,
    pub model: Option<String>,
    pub latency_ms: u128,
}

/// Handler: GET /health
///
/// Never fails: probe errors surface as `status: "unreachable"`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    let probe = state.health.check(&state.llm_config).await;

    Json(HealthBody {
        status: if probe.ok { "ok" } else { "unreachable" },
        provider: probe.provider,
        model: probe.model,
        latency_ms: probe.latency_ms,
    })
}
