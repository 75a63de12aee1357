use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub short_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    /// HTTP status code, repeated for clients that only see the body.
    pub code: u16,
    pub timestamp: Timestamp,
}
