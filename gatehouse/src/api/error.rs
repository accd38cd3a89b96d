use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::error::RbacError;
use thiserror::Error;
use tracing::error;

#[derive(Clone, Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Missing x-gatehouse-actor header")]
    MissingActor,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn get_error_msg(&self) -> (StatusCode, String) {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::MissingActor => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string())
    }
}

impl From<RbacError> for AppError {
    fn from(e: RbacError) -> Self {
        match e {
            RbacError::NotFound { .. } => AppError::NotFound(e.to_string()),
            RbacError::Referenced { .. } | RbacError::Duplicate { .. } => {
                AppError::Conflict(e.to_string())
            }
            RbacError::InvalidOverrideMode(_) | RbacError::InvalidInput(_) => {
                AppError::InvalidInput(e.to_string())
            }
            RbacError::Persistence { .. } => {
                error!("Store failure: {}", e);
                AppError::InternalServerError(e.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        AppError::InternalServerError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.get_error_msg();
        let body = serde_json::json!({ "error": true, "message": body });
        (status, Json(body)).into_response()
    }
}
