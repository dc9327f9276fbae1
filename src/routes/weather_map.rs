//! Weather-map HTTP endpoint.
//!
//! - GET /api/weather-map?lat&lon&zoom={small|medium|large}&map__type={clouds|precipitation|pressure|wind|temperature}
//!
//! Enum membership is validated here, before the assembler is invoked; a
//! value outside the sets short-circuits into the `{error}` payload. Success
//! responses are raw PNG bytes.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::Response;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::weather::parse_coordinates;
use crate::routes::AppState;
use crate::services::map::{MapLayer, MapZoom};

pub(crate) const INVALID_MAP_MSG: &str =
    "ERROR: Please provide valid coordinates, zoom level and map layer type.";

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherMapQuery {
    /// Latitude as a decimal string
    pub lat: Option<String>,
    /// Longitude as a decimal string
    pub lon: Option<String>,
    /// Viewport size: small, medium or large
    pub zoom: Option<String>,
    /// Weather layer: clouds, precipitation, pressure, wind or temperature
    #[serde(rename = "map__type")]
    pub map_type: Option<String>,
}

/// Get the composed weather map for a coordinate.
#[utoipa::path(
    get,
    path = "/api/weather-map",
    tag = "Weather",
    params(WeatherMapQuery),
    responses(
        (status = 200, description = "Composed map as PNG", body = Vec<u8>, content_type = "image/png"),
        (status = 200, description = "Validation or upstream failure", body = ErrorResponse),
    )
)]
pub async fn get_weather_map(
    State(state): State<AppState>,
    Query(params): Query<WeatherMapQuery>,
) -> Result<Response, AppError> {
    let zoom: MapZoom = params
        .zoom
        .as_deref()
        .and_then(|z| z.parse().ok())
        .ok_or_else(|| AppError::InvalidQuery(INVALID_MAP_MSG.to_string()))?;
    let layer: MapLayer = params
        .map_type
        .as_deref()
        .and_then(|l| l.parse().ok())
        .ok_or_else(|| AppError::InvalidQuery(INVALID_MAP_MSG.to_string()))?;
    let (lat, lon) = parse_coordinates(&params.lat, &params.lon)?;

    let png = state.map.assemble(lat, lon, zoom, layer).await?;

    Response::builder()
        .header(CONTENT_TYPE, "image/png")
        .header(CONTENT_LENGTH, png.len())
        .body(Body::from(png))
        .map_err(|e| AppError::Internal(format!("Failed to build map response: {}", e)))
}
