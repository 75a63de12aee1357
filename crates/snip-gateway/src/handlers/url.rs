use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

pub async fn create_url_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = request?;
    let short_url = state.shortener().shorten(&request.url).await?;
    info!(short_url = %short_url, "Created short url");

    Ok(Json(CreateUrlResponse {
        short_url: short_url.to_string(),
    }))
}

pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let original_url = state.shortener().resolve(&token).await?;
    let location = HeaderValue::from_str(&original_url)
        .map_err(|_| AppError::UnusableRedirect(original_url.clone()))?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}
