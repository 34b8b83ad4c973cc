use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::orchestrator::AnalysisError;
use crate::pipeline::stages::{StageError, StageName};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The model could not be reached or refused the call.
    #[error("Model error at stage '{stage}': {message}")]
    Model { stage: StageName, message: String },

    /// The model replied but nothing usable could be recovered.
    #[error("Unusable model output at stage '{stage}': {message}")]
    Parse { stage: StageName, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(e) => AppError::Validation(e.to_string()),
            AnalysisError::Failed {
                stage,
                cause: StageError::Model(e),
            } => AppError::Model {
                stage,
                message: e.to_string(),
            },
            AnalysisError::Failed {
                stage,
                cause: StageError::Parse(e),
            } => AppError::Parse {
                stage,
                message: e.to_string(),
            },
            other @ AnalysisError::OutOfOrder { .. } => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, stage) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Model { stage, message } => {
                tracing::error!("Model error at stage {stage}: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_ERROR",
                    format!(
                        "Could not get a response from the AI model during {stage}: {message}"
                    ),
                    Some(*stage),
                )
            }
            AppError::Parse { stage, message } => {
                tracing::error!("Unusable model output at stage {stage}: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    format!("The AI model returned data that could not be used during {stage}"),
                    Some(*stage),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(json!({
            "detail": message,
            "error": {
                "code": code,
                "message": message,
                "stage": stage
            }
        }));

        (status, body).into_response()
    }
}
