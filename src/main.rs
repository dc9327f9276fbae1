// Weather Atlas API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use weather_atlas_api::config::AppConfig;
use weather_atlas_api::routes::{self, AppState};
use weather_atlas_api::services::geocode::GeocodeClient;
use weather_atlas_api::services::map::MapAssembler;
use weather_atlas_api::services::openweather::OneCallClient;

/// Weather Atlas API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Atlas API",
        version = "0.1.0",
        description = "Weather visualization backend. Resolves free-text addresses through a \
            geocoding provider, proxies current/hourly/daily forecast bundles from a weather \
            provider, composes weather-layer map tiles into single PNG images, and renders \
            the daily temperature-range graph server-side as SVG.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Location", description = "Address resolution"),
        (name = "Weather", description = "Forecast, map and graph retrieval"),
    ),
    paths(
        routes::health::health_check,
        routes::location::find_location,
        routes::weather::get_weather,
        routes::weather_map::get_weather_map,
        routes::graph::get_weather_graph,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::location::FindLocationResponse,
            routes::weather::LocationFields,
            routes::weather::WeatherResponse,
            weather_atlas_api::services::openweather::ForecastBundle,
            weather_atlas_api::services::openweather::CurrentConditions,
            weather_atlas_api::services::openweather::HourlyForecast,
            weather_atlas_api::services::openweather::DailyForecast,
            weather_atlas_api::services::openweather::TemperatureRange,
            weather_atlas_api::services::openweather::ConditionTag,
            weather_atlas_api::errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_atlas_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Upstream clients
    let geocoder = GeocodeClient::new(&config.mapbox_token);
    let weather = OneCallClient::new(&config.owm_api_key);
    let map = MapAssembler::new(&config.owm_api_key, &config.tile_user_agent);

    let app_state = AppState {
        geocoder,
        weather,
        map,
    };

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/find-location", get(routes::location::find_location))
        .route("/api/weather", get(routes::weather::get_weather))
        .route("/api/weather-map", get(routes::weather_map::get_weather_map))
        .route("/api/weather-graph", get(routes::graph::get_weather_graph))
        .with_state(app_state);

    // Static single-page app bundle; unknown paths fall back to its shell so
    // client-side routing can take over.
    let index_path = format!("{}/index.html", config.static_dir.trim_end_matches('/'));
    let spa = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(spa)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server is up on port {}.", config.port);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
