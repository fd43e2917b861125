use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse, StatsResponse};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jiff::Timestamp;
use shortlink_core::{ShortCode, ShortenParams};
use tracing::{debug, warn};

/// The body is decoded as JSON regardless of `Content-Type`.
pub async fn shorten_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ShortenResponse>> {
    let request: ShortenRequest = serde_json::from_slice(&body)?;
    let params = shorten_params(request)?;

    let created = state.shortener().shorten(params).await?;

    Ok(Json(ShortenResponse {
        short_url: created.short_url,
        short_code: created.short_code.to_string(),
    }))
}

fn shorten_params(request: ShortenRequest) -> Result<ShortenParams> {
    let custom_code = request
        .custom_code
        .filter(|code| !code.is_empty())
        .map(ShortCode::custom)
        .transpose()?;

    let expires_at = request
        .expires_at
        .filter(|ts| !ts.is_empty())
        .map(|ts| {
            ts.parse::<Timestamp>()
                .map_err(|e| AppError::BadRequest(format!("invalid expires_at '{ts}': {e}")))
        })
        .transpose()?;

    Ok(ShortenParams {
        original_url: request.url,
        custom_code,
        expires_at,
    })
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response> {
    // A code that fails to parse can never have been stored.
    let code = ShortCode::parse(code).map_err(|e| {
        debug!(error = %e, "rejecting malformed short code");
        AppError::NotFound("URL not found".to_string())
    })?;

    let url = state.redirector().resolve(&code).await?;

    let location = HeaderValue::try_from(url).map_err(|e| {
        warn!(code = %code, error = %e, "stored URL is not a valid Location header");
        AppError::Internal("failed to resolve URL".to_string())
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.shortener().stats().await?;
    Ok(Json(stats.into()))
}
