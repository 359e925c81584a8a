use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Too many login attempts, try again later")]
    RateLimited,

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Category not found")]
    InvalidCategory,

    #[error("Missing required header")]
    InvalidRequest,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidCategory => "INVALID_CATEGORY",
            AppError::InvalidRequest => "INVALID_REQUEST",
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Token(_)
            | AppError::Internal(_) => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Duplicate(_)
            | AppError::Forbidden(_)
            | AppError::InvalidCategory
            | AppError::InvalidRequest => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Token(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(msg)
            | AppError::Duplicate(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized
            | AppError::InvalidCredentials
            | AppError::RateLimited
            | AppError::InvalidCategory
            | AppError::InvalidRequest => self.to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Token(e) => {
                tracing::error!("Token error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "code": self.code(),
            }
        }));

        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::Validation("Invalid ID".into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
