use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorResponse;
use crate::AppError;

/// Converts `AppError` into the appropriate HTTP response.
///
/// The status mapping lives here and nowhere else.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse::from(self.0.clone());
        let status = match &self.0 {
            AppError::MissingInput(_) => StatusCode::BAD_REQUEST,
            // Unknown login keeps its own status, distinct from a wrong
            // password; this mirrors the login contract even though it leaks
            // account existence.
            AppError::UserNotFound | AppError::BookNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials
            | AppError::SessionNotFound
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(error_response)).into_response()
    }
}
