use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jiff::Timestamp;
use snip_shortener::ShortenerError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "an unexpected error occurred, please try again later";

#[derive(Debug)]
pub enum AppError {
    Shortener(ShortenerError),
    /// The request body could not be read as the expected JSON.
    Body(JsonRejection),
    /// The original URL cannot be sent back in a `Location` header.
    UnusableRedirect(String),
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        AppError::Shortener(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Body(rejection)
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                ShortenerError::AlreadyExists { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                ShortenerError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ShortenerError::Internal(cause) => {
                    error!(error = %cause, "Request failed on the storage backend");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            AppError::Body(rejection) => (rejection.status(), rejection.body_text()),
            AppError::UnusableRedirect(url) => {
                error!(url = %url, "Stored url is not a valid Location header");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = ErrorResponse {
            message,
            code: status.as_u16(),
            timestamp: Timestamp::now(),
        };
        (status, Json(body)).into_response()
    }
}
