use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(anyhow::Error),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("this time slot has just filled up, please choose another")]
    CapacityExceeded,

    #[error("invalid signature")]
    Integrity,

    #[error("cannot {action} a booking in status {current}")]
    InvalidTransition { action: &'static str, current: String },

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "ServiceError",
            AppError::Internal(_) => "ServiceError",
            AppError::Validation(_) => "ValidationError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::CapacityExceeded => "CapacityExceededError",
            AppError::Integrity => "IntegrityError",
            AppError::InvalidTransition { .. } => "InvalidTransitionError",
            AppError::Gateway(_) => "GatewayError",
            AppError::Unauthorized => "Unauthorized",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded => StatusCode::CONFLICT,
            AppError::Integrity => StatusCode::FORBIDDEN,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "kind": self.kind(), "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
