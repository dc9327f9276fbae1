//! OpenWeatherMap One Call 3.0 client.
//!
//! Fetches the combined current/hourly/daily forecast bundle for a
//! coordinate. Bundles are requested in metric units; unit preference is a
//! render-time concern (see `helpers`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

const ONECALL_BASE_URL: &str = "https://api.openweathermap.org";

/// The combined forecast data for one location.
///
/// Fetched atomically: callers either get the whole bundle (with non-empty
/// hourly and daily sequences) or an error, never a partial bundle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForecastBundle {
    pub lat: f64,
    pub lon: f64,
    /// Shift in seconds from UTC for the location's timezone.
    pub timezone_offset: i32,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentConditions {
    /// Observation time, Unix seconds UTC
    pub dt: i64,
    /// Air temperature in °C
    pub temp: f64,
    pub feels_like: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// UV index
    #[serde(default)]
    pub uvi: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    pub weather: Vec<ConditionTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    #[serde(default)]
    pub uvi: f64,
    pub wind_speed: f64,
    /// Precipitation probability, 0.0–1.0
    #[serde(default)]
    pub pop: f64,
    pub weather: Vec<ConditionTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyForecast {
    pub dt: i64,
    pub temp: TemperatureRange,
    pub humidity: f64,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub pop: f64,
    pub weather: Vec<ConditionTag>,
}

/// Daily temperature spread in °C.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub day: f64,
    #[serde(default)]
    pub night: f64,
}

/// Weather-condition code as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConditionTag {
    pub main: String,
    pub description: String,
    /// Provider icon code, e.g. "10d"
    pub icon: String,
}

/// Port for anything that can produce a forecast bundle for a coordinate.
///
/// The session state machine depends on this seam so its cancellation and
/// readiness transitions can be tested against a scripted provider.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, lat: f64, lon: f64) -> Result<ForecastBundle, AppError>;
}

/// Client for the One Call forecast API.
#[derive(Debug, Clone)]
pub struct OneCallClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OneCallClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: ONECALL_BASE_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Point the client at a different host. Tests use this with wiremock.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch the forecast bundle for a coordinate. No retry.
    pub async fn fetch_bundle(&self, lat: f64, lon: f64) -> Result<ForecastBundle, AppError> {
        let url = format!(
            "{}/data/3.0/onecall?lat={:.4}&lon={:.4}&units=metric&exclude=minutely,alerts&appid={}",
            self.base_url, lat, lon, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Weather provider returned HTTP {}",
                response.status()
            )));
        }

        let bundle: ForecastBundle = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Weather JSON parse error: {}", e)))?;

        // A bundle without hourly or daily records is unusable for every
        // consumer; treat it as an upstream failure rather than a partial result.
        if bundle.hourly.is_empty() || bundle.daily.is_empty() {
            return Err(AppError::Upstream(
                "Weather provider returned an empty forecast".to_string(),
            ));
        }

        Ok(bundle)
    }
}

#[async_trait]
impl ForecastProvider for OneCallClient {
    async fn fetch(&self, lat: f64, lon: f64) -> Result<ForecastBundle, AppError> {
        self.fetch_bundle(lat, lon).await
    }
}

#[cfg(test)]
pub(crate) fn sample_bundle() -> ForecastBundle {
    let tag = ConditionTag {
        main: "Clouds".to_string(),
        description: "scattered clouds".to_string(),
        icon: "03d".to_string(),
    };
    ForecastBundle {
        lat: 48.85,
        lon: 2.35,
        timezone_offset: 3600,
        current: CurrentConditions {
            dt: 1657810800,
            temp: 21.3,
            feels_like: 20.9,
            humidity: 55.0,
            uvi: 4.1,
            wind_speed: 3.2,
            weather: vec![tag.clone()],
        },
        hourly: (0..48)
            .map(|h| HourlyForecast {
                dt: 1657810800 + h * 3600,
                temp: 18.0 + (h % 12) as f64,
                feels_like: 18.0,
                humidity: 60.0,
                uvi: 2.0,
                wind_speed: 2.5,
                pop: 0.1,
                weather: vec![tag.clone()],
            })
            .collect(),
        daily: (0..8)
            .map(|d| DailyForecast {
                dt: 1657810800 + d * 86_400,
                temp: TemperatureRange {
                    min: 12.0 + d as f64,
                    max: 22.0 + d as f64,
                    day: 20.0,
                    night: 14.0,
                },
                humidity: 58.0,
                uvi: 5.0,
                pop: 0.2,
                weather: vec![tag.clone()],
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_bundle_decodes_onecall_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "lat": 48.85,
                    "lon": 2.35,
                    "timezone_offset": 3600,
                    "current": {
                        "dt": 1657810800,
                        "temp": 21.3,
                        "feels_like": 20.9,
                        "humidity": 55,
                        "uvi": 4.1,
                        "wind_speed": 3.2,
                        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}]
                    },
                    "hourly": [{
                        "dt": 1657810800,
                        "temp": 21.3,
                        "feels_like": 20.9,
                        "humidity": 55,
                        "wind_speed": 3.2,
                        "pop": 0.05,
                        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}]
                    }],
                    "daily": [{
                        "dt": 1657810800,
                        "temp": {"min": 14.2, "max": 24.8, "day": 22.0, "night": 15.5},
                        "humidity": 60,
                        "uvi": 6.2,
                        "pop": 0.3,
                        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}]
                    }]
                })),
            )
            .mount(&server)
            .await;

        let client = OneCallClient::new("key").with_base_url(&server.uri());
        let bundle = client.fetch_bundle(48.8534, 2.3488).await.unwrap();

        assert_eq!(bundle.timezone_offset, 3600);
        assert_eq!(bundle.hourly.len(), 1);
        assert_eq!(bundle.daily[0].temp.max, 24.8);
        assert_eq!(bundle.current.weather[0].icon, "01d");
    }

    #[tokio::test]
    async fn test_fetch_bundle_rejects_empty_sequences() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "lat": 0.0,
                    "lon": 0.0,
                    "timezone_offset": 0,
                    "current": {
                        "dt": 0, "temp": 0.0, "feels_like": 0.0, "humidity": 0,
                        "wind_speed": 0.0, "weather": []
                    },
                    "hourly": [],
                    "daily": []
                })),
            )
            .mount(&server)
            .await;

        let client = OneCallClient::new("key").with_base_url(&server.uri());
        let err = client.fetch_bundle(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_fetch_bundle_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = OneCallClient::new("bad-key").with_base_url(&server.uri());
        let err = client.fetch_bundle(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_bundle_reserializes_for_clients() {
        let bundle = sample_bundle();
        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json.get("current").is_some());
        assert_eq!(json["daily"].as_array().unwrap().len(), 8);
    }
}
