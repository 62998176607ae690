//! POST /guide — runs the six-stage guided-answer pipeline.

use std::sync::Arc;

use axum::{Json, extract::State};
use guide_pipeline::GuideRequest;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::guide::guide_request::{GuideRequestBody, GuideResponseBody},
};

/// Handler: POST /guide
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/guide \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is dharma?","user_level":"beginner"}'
/// ```
pub async fn guide(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GuideRequestBody>,
) -> AppResult<Json<GuideResponseBody>> {
    let run = state
        .pipeline
        .run(GuideRequest {
            question: body.question,
            user_level: body.user_level,
            context: body.context,
        })
        .await?;

    // The full trace stays server-side; clients get answer + total time only.
    for step in &run.trace {
        debug!(
            step = step.step_number,
            name = step.step_name,
            duration_ms = step.duration_ms,
            details = %step.details,
            "pipeline step"
        );
    }
    info!(
        execution_time_ms = run.execution_time_ms,
        verses = run.answer.verse_references.len(),
        "guide request served"
    );

    Ok(Json(GuideResponseBody {
        answer: run.answer,
        execution_time_ms: run.execution_time_ms,
    }))
}
