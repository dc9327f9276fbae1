//! Daily temperature-graph HTTP endpoint.
//!
//! - GET /api/weather-graph?lat&lon&units={metric|imperial}
//!
//! Fetches the forecast bundle and renders the daily temperature-range
//! ribbon chart server-side as SVG.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::helpers::Units;
use crate::render::svg::daily_graph_svg;
use crate::routes::weather::parse_coordinates;
use crate::routes::AppState;

const INVALID_UNITS_MSG: &str = "ERROR: Please provide valid units (metric or imperial).";

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherGraphQuery {
    /// Latitude as a decimal string
    pub lat: Option<String>,
    /// Longitude as a decimal string
    pub lon: Option<String>,
    /// Display units, metric (default) or imperial
    pub units: Option<String>,
}

/// Render the daily temperature-range graph for a coordinate.
#[utoipa::path(
    get,
    path = "/api/weather-graph",
    tag = "Weather",
    params(WeatherGraphQuery),
    responses(
        (status = 200, description = "Daily ribbon chart as SVG", body = String, content_type = "image/svg+xml"),
        (status = 200, description = "Validation or upstream failure", body = ErrorResponse),
    )
)]
pub async fn get_weather_graph(
    State(state): State<AppState>,
    Query(params): Query<WeatherGraphQuery>,
) -> Result<Response, AppError> {
    let units = match params.units.as_deref() {
        None => Units::default(),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidQuery(INVALID_UNITS_MSG.to_string()))?,
    };
    let (lat, lon) = parse_coordinates(&params.lat, &params.lon)?;

    let bundle = state.weather.fetch_bundle(lat, lon).await?;
    let svg = daily_graph_svg(&bundle, units).map_err(|e| {
        AppError::Internal(format!("ERROR: Unable to render the temperature graph: {}", e))
    })?;

    Response::builder()
        .header(CONTENT_TYPE, "image/svg+xml")
        .body(Body::from(svg))
        .map_err(|e| AppError::Internal(format!("Failed to build graph response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geocode::GeocodeClient;
    use crate::services::map::MapAssembler;
    use crate::services::openweather::{sample_bundle, OneCallClient};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(server: &MockServer) -> AppState {
        AppState {
            geocoder: GeocodeClient::new("tok").with_base_url(&server.uri()),
            weather: OneCallClient::new("key").with_base_url(&server.uri()),
            map: MapAssembler::new("key", "test-agent")
                .with_tile_urls(&server.uri(), &server.uri()),
        }
    }

    #[tokio::test]
    async fn test_graph_renders_svg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::to_value(sample_bundle()).unwrap()),
            )
            .mount(&server)
            .await;

        let query = WeatherGraphQuery {
            lat: Some("48.85".to_string()),
            lon: Some("2.35".to_string()),
            units: Some("imperial".to_string()),
        };
        let response = get_weather_graph(State(test_state(&server)), Query(query))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
    }

    #[tokio::test]
    async fn test_invalid_units_short_circuit() {
        let server = MockServer::start().await;
        let query = WeatherGraphQuery {
            lat: Some("48.85".to_string()),
            lon: Some("2.35".to_string()),
            units: Some("kelvin".to_string()),
        };
        let err = get_weather_graph(State(test_state(&server)), Query(query))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), INVALID_UNITS_MSG);
    }
}
