//! HTTP surface for the Sage backend.
//!
//! Routes:
//! - `POST /guide`  — the guided-answer pipeline (rate limited)
//! - `GET  /health` — provider reachability probe

use std::sync::Arc;

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::error_handler::AppError;

use crate::core::app_state::AppState;
use crate::middleware_layer::rate_limit::admission_guard;
use crate::routes::{guide::guide_route::guide, health_route::health};

/// Builds state from the environment and serves until Ctrl+C.
///
/// # Errors
/// Returns [`AppError`] when configuration is incomplete, the corpus cannot
/// be loaded, or the listener cannot be bound.
pub async fn start() -> Result<(), AppError> {
    let host_url =
        std::env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::from_env()?);

    // Only the guide route sits behind admission control; health stays open
    // so orchestrators can probe a throttled instance.
    let guarded = Router::new()
        .route("/guide", post(guide))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission_guard,
        ));

    let app = Router::new()
        .merge(guarded)
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
