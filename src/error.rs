use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::render;

/// The primary error type for request handling.
///
/// Everything a handler can fail with collapses into one of these; the
/// `IntoResponse` impl turns them into rendered error pages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A database operation failed. Details are logged, never rendered.
    #[error("Database error: {0}")]
    Database(String),
    /// Anything unexpected.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, render::not_found_page(&msg)).into_response()
            }
            AppError::Database(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Database error [{}]: {}", error_id, msg);
                (StatusCode::INTERNAL_SERVER_ERROR, render::error_page(error_id)).into_response()
            }
            AppError::Internal(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Internal error [{}]: {:?}", error_id, e);
                (StatusCode::INTERNAL_SERVER_ERROR, render::error_page(error_id)).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => AppError::Database(db_err.message().to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used by all handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait turning an absent `Option` into a `NotFound` error.
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
    }
}
