use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use guide_pipeline::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("startup failed: {0}")]
    Startup(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("too many requests, please slow down")]
    RateLimited,

    /// The answer provider could not be reached or returned an error.
    #[error("the guidance service is temporarily unavailable, please try again")]
    Upstream(String),

    /// Fatal processing failure (malformed model reply, corrupt store).
    #[error("failed to process your question, please try again")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingEnv(_) => StatusCode::INTERNAL_SERVER_ERROR, // startup-only
            AppError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR,    // startup-only
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Startup(_) => "STARTUP_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Technical detail string for the response body. Never raw upstream
    /// payloads; the pipeline already trims model text to short previews.
    fn details(&self) -> Option<String> {
        match self {
            AppError::Upstream(d) | AppError::Internal(d) => Some(d.clone()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Upstream(d) | AppError::Internal(d) => {
                error!(code = self.error_code(), detail = %d, "request failed");
            }
            _ => {
                warn!(code = self.error_code(), "request rejected: {self}");
            }
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(msg) => AppError::BadRequest(msg),
            PipelineError::MalformedReply { stage, detail } => {
                AppError::Internal(format!("{stage}: {detail}"))
            }
            PipelineError::Llm(e) => AppError::Upstream(e.to_string()),
            PipelineError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn status_and_body(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_body_carries_the_message_and_no_details() {
        let (status, body) =
            status_and_body(AppError::BadRequest("question must not be empty".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad request: question must not be empty");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn rate_limited_body_is_generic() {
        let (status, body) = status_and_body(AppError::RateLimited).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "too many requests, please slow down");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn internal_error_keeps_the_generic_message_with_details() {
        let (status, body) =
            status_and_body(AppError::Internal("Understand Intent: bad json".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "failed to process your question, please try again"
        );
        assert_eq!(body["details"], "Understand Intent: bad json");
    }

    #[tokio::test]
    async fn upstream_error_maps_to_bad_gateway() {
        let (status, body) = status_and_body(AppError::Upstream("provider timeout".into())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["details"], "provider timeout");
    }

    #[test]
    fn pipeline_validation_maps_to_bad_request() {
        let err = AppError::from(PipelineError::Validation("question too long".into()));
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
