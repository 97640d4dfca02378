use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

use crate::ai::ModelError;
use crate::pipeline::PipelineError;

/// Error type for HTTP handlers, rendered as `{"error", "code"}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The model service failed or is not configured.
    #[error(transparent)]
    Upstream(#[from] ModelError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Malformed or incomplete request bodies share the JSON error shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn upstream(err: &ModelError) -> (StatusCode, &'static str, String) {
    error!("Upstream model error: {}", err);
    let code = match err {
        ModelError::MissingApiKey => "MODEL_NOT_CONFIGURED",
        _ => "UPSTREAM_ERROR",
    };
    (StatusCode::BAD_GATEWAY, code, err.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Upstream(err) => upstream(err),
            AppError::Pipeline(PipelineError::Image(err)) => upstream(err),
            AppError::Pipeline(PipelineError::Deck(err)) => {
                error!("Deck serialization failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Failed to build the presentation".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Upstream(ModelError::Status {
                    status: 503,
                    body: "busy".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Pipeline(PipelineError::Image(ModelError::EmptyResponse)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Pipeline(PipelineError::Deck(std::fmt::Error.into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
