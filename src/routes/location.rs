//! Location search HTTP endpoint.
//!
//! - GET /api/find-location?address=<string>

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::{AppError, ErrorResponse};
use crate::routes::AppState;

const INVALID_ADDRESS_MSG: &str = "ERROR: Please type a valid location for the search.";

#[derive(Debug, Deserialize, IntoParams)]
pub struct FindLocationQuery {
    /// Free-text address to resolve
    pub address: Option<String>,
}

/// A resolved location search result.
#[derive(Debug, Serialize, ToSchema)]
pub struct FindLocationResponse {
    /// Full resolved place name
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Resolve a free-text address to coordinates and place-name fields.
#[utoipa::path(
    get,
    path = "/api/find-location",
    tag = "Location",
    params(FindLocationQuery),
    responses(
        (status = 200, description = "Resolved location", body = FindLocationResponse),
        (status = 200, description = "Validation or lookup failure", body = ErrorResponse),
    )
)]
pub async fn find_location(
    State(state): State<AppState>,
    Query(params): Query<FindLocationQuery>,
) -> Result<Json<FindLocationResponse>, AppError> {
    let address = params
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::InvalidQuery(INVALID_ADDRESS_MSG.to_string()))?;

    let resolved = state.geocoder.resolve(address).await?;

    Ok(Json(FindLocationResponse {
        address: resolved.place_name.clone(),
        lat: resolved.latitude,
        lon: resolved.longitude,
        city: resolved.city(),
        state: resolved.state(),
        country: resolved.country(),
    }))
}
