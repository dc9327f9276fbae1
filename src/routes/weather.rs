//! Forecast HTTP endpoint.
//!
//! - GET /api/weather?lat=<f64>&lon=<f64>
//! - GET /api/weather?address=<string>
//!
//! One canonical contract with two input forms: the address form geocodes
//! first and additionally carries the resolved location fields. Validation
//! failures and upstream failures both short-circuit into a 200 `{error}`
//! payload before/instead of the forecast body — a response is one or the
//! other, never both.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::{AppError, ErrorResponse};
use crate::routes::AppState;
use crate::services::geocode::ResolvedLocation;
use crate::services::openweather::{CurrentConditions, DailyForecast, HourlyForecast};

pub(crate) const INVALID_COORDS_MSG: &str = "ERROR: Please provide valid coordinates.";

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherQuery {
    /// Latitude as a decimal string (paired with `lon`)
    pub lat: Option<String>,
    /// Longitude as a decimal string (paired with `lat`)
    pub lon: Option<String>,
    /// Free-text address; overrides `lat`/`lon` when present
    pub address: Option<String>,
}

/// Resolved place-name fields, present on address lookups.
#[derive(Debug, Serialize, ToSchema)]
pub struct LocationFields {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl From<&ResolvedLocation> for LocationFields {
    fn from(resolved: &ResolvedLocation) -> Self {
        Self {
            city: resolved.city(),
            state: resolved.state(),
            country: resolved.country(),
        }
    }
}

/// Forecast response: the full bundle, plus location fields when the lookup
/// started from an address.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFields>,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

/// Parse a lat/lon string pair into finite floats.
pub(crate) fn parse_coordinates(
    lat: &Option<String>,
    lon: &Option<String>,
) -> Result<(f64, f64), AppError> {
    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(AppError::InvalidQuery(INVALID_COORDS_MSG.to_string())),
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| AppError::InvalidQuery(INVALID_COORDS_MSG.to_string()))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| AppError::InvalidQuery(INVALID_COORDS_MSG.to_string()))?;

    if !lat.is_finite() || !lon.is_finite() {
        return Err(AppError::InvalidQuery(INVALID_COORDS_MSG.to_string()));
    }

    Ok((lat, lon))
}

/// Get the forecast bundle for a coordinate or an address.
///
/// At most two sequential outbound calls: geocode (address form only), then
/// the weather provider.
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "Weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Forecast bundle, or an error payload", body = WeatherResponse),
        (status = 200, description = "Validation or upstream failure", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, AppError> {
    let address = params
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    if let Some(address) = address {
        let resolved = state.geocoder.resolve(address).await?;
        let bundle = state
            .weather
            .fetch_bundle(resolved.latitude, resolved.longitude)
            .await?;
        return Ok(Json(WeatherResponse {
            location: Some(LocationFields::from(&resolved)),
            current: bundle.current,
            hourly: bundle.hourly,
            daily: bundle.daily,
        }));
    }

    let (lat, lon) = parse_coordinates(&params.lat, &params.lon)?;
    let bundle = state.weather.fetch_bundle(lat, lon).await?;
    Ok(Json(WeatherResponse {
        location: None,
        current: bundle.current,
        hourly: bundle.hourly,
        daily: bundle.daily,
    }))
}
