//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::store::StoreError;

/// Failure of the resource-query pipeline.
///
/// Both variants mean the same thing to callers: no page this time, the
/// cached value (if any) is still intact, try `refetch`. The split exists
/// so logs distinguish which leg of the pipeline failed.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A count, boundary, or page query against the resource store failed.
    #[error("resource store query failed")]
    StoreUnavailable(#[source] StoreError),

    /// A like relation lookup failed; no partial page is returned.
    #[error("like aggregation failed")]
    Aggregation(#[source] StoreError),
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource query failed")]
    Query(#[from] QueryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Query(_) => StatusCode::BAD_GATEWAY,
        };

        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Query(e) => {
                tracing::warn!(error = %e, "resource query failed");
                "resource query failed".to_string()
            }
            AppError::BadRequest(_) => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
