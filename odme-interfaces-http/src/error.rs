use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use odme_application::AppError;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound,
    /// Storage failures. The cause was already logged by the application
    /// layer and is never sent to the client.
    Internal,
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::NotFound => HttpError::NotFound,
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::Storage(_) => HttpError::Internal,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::NotFound => (StatusCode::NOT_FOUND, "Anomaly not found".to_string()),
            HttpError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error occurred".to_string(),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
