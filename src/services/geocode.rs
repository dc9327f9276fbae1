//! Forward geocoding client.
//!
//! Resolves a free-text address to coordinates and an ordered sequence of
//! place-name components via a Mapbox-style `*.places` endpoint. The last
//! three components are the city, state/region and country.

use serde::Deserialize;

use crate::errors::AppError;

const GEOCODE_BASE_URL: &str = "https://api.mapbox.com";

/// Error payload message for any lookup that produces no usable result.
const LOOKUP_FAILED_MSG: &str = "ERROR: Unable to resolve the requested address.";

/// Client for the forward-geocoding API.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

/// A resolved location: coordinates plus ordered place-name components.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    /// Full place name, e.g. "Austin, Texas, United States".
    pub place_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Ordered name components; city, state/region and country trail.
    pub components: Vec<String>,
}

impl ResolvedLocation {
    fn trailing(&self, back: usize) -> String {
        let n = self.components.len();
        n.checked_sub(back)
            .and_then(|i| self.components.get(i))
            .cloned()
            .unwrap_or_default()
    }

    pub fn city(&self) -> String {
        self.trailing(3)
    }

    pub fn state(&self) -> String {
        self.trailing(2)
    }

    pub fn country(&self) -> String {
        self.trailing(1)
    }
}

// --- geocoder JSON response types ---

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    place_name: String,
    /// `[longitude, latitude]`
    center: [f64; 2],
}

impl GeocodeClient {
    pub fn new(access_token: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: GEOCODE_BASE_URL.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Point the client at a different host. Tests use this with wiremock.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Resolve a free-text address to coordinates and place-name components.
    ///
    /// One outbound call, no retry. Any failure collapses into a single
    /// generic `Upstream` error payload for the caller.
    pub async fn resolve(&self, address: &str) -> Result<ResolvedLocation, AppError> {
        let url = format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}&limit=1",
            self.base_url,
            urlencoding::encode(address),
            self.access_token
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Geocoding request failed: {}", e);
            AppError::Upstream(LOOKUP_FAILED_MSG.to_string())
        })?;

        if !response.status().is_success() {
            tracing::warn!("Geocoder returned HTTP {}", response.status());
            return Err(AppError::Upstream(LOOKUP_FAILED_MSG.to_string()));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            tracing::warn!("Geocoder JSON parse error: {}", e);
            AppError::Upstream(LOOKUP_FAILED_MSG.to_string())
        })?;

        let feature = body
            .features
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream(LOOKUP_FAILED_MSG.to_string()))?;

        let components: Vec<String> = feature
            .place_name
            .split(", ")
            .map(|s| s.to_string())
            .collect();

        Ok(ResolvedLocation {
            place_name: feature.place_name,
            latitude: feature.center[1],
            longitude: feature.center[0],
            components,
        })
    }
}
