use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::proposal::invoker::GenError;
use crate::proposal::pipeline::PipelineError;
use crate::proposal::quota::QuotaError;

/// Shown for replies that failed the output contract or came back empty.
const UNPARSEABLE_REPLY_MESSAGE: &str = "Failed to parse AI response. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Quota exceeded: {used}/{ceiling}")]
    QuotaExceeded { used: u32, ceiling: u32 },

    #[error(transparent)]
    QuotaUnavailable(#[from] QuotaError),

    #[error(transparent)]
    Generation(#[from] GenError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::QuotaExceeded { used, ceiling } => {
                AppError::QuotaExceeded { used, ceiling }
            }
            PipelineError::QuotaUnavailable(e) => AppError::QuotaUnavailable(e),
            PipelineError::Generation(e) => AppError::Generation(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::QuotaExceeded { ceiling, .. } => (
                StatusCode::FORBIDDEN,
                "QUOTA_EXCEEDED",
                format!("You have reached the maximum limit of {ceiling} proposals."),
            ),
            AppError::QuotaUnavailable(e) => {
                tracing::error!("Quota error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "QUOTA_UNAVAILABLE",
                    "Usage could not be verified. Please try again shortly.".to_string(),
                )
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                match e {
                    GenError::Transport(_) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "GENERATION_TIMEOUT",
                        "Failed to generate proposal. Please check your connection and try again."
                            .to_string(),
                    ),
                    GenError::EmptyReply => (
                        StatusCode::BAD_GATEWAY,
                        "EMPTY_REPLY",
                        UNPARSEABLE_REPLY_MESSAGE.to_string(),
                    ),
                    GenError::ContractViolation { .. } => (
                        StatusCode::BAD_GATEWAY,
                        "CONTRACT_VIOLATION",
                        UNPARSEABLE_REPLY_MESSAGE.to_string(),
                    ),
                    GenError::Upstream(msg) => {
                        (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
                    }
                }
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::store::StoreError;
    use uuid::Uuid;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::QuotaExceeded {
                used: 5,
                ceiling: 5
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::QuotaUnavailable(QuotaError(
                StoreError::UnknownIdentity(Uuid::new_v4())
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(GenError::Transport("t".into()).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(GenError::EmptyReply.into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GenError::Upstream("Invalid API Key".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_pipeline_quota_error_converts() {
        let err: AppError = PipelineError::QuotaExceeded {
            used: 6,
            ceiling: 5,
        }
        .into();
        assert!(matches!(err, AppError::QuotaExceeded { used: 6, .. }));
    }
}
