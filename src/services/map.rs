//! Weather-map assembler.
//!
//! Stitches a 3×3 grid of base-map tiles around a coordinate, overlays the
//! matching weather-layer tiles, and encodes the result as one PNG buffer.
//! Tiles are fetched sequentially and never cached.

use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, RgbaImage};
use reqwest::header::USER_AGENT;

use crate::errors::AppError;

const BASE_TILE_URL: &str = "https://tile.openstreetmap.org";
const LAYER_TILE_URL: &str = "https://tile.openweathermap.org";

/// Slippy tiles are 256px; the composed map is a 3×3 grid.
const TILE_SIZE: u32 = 256;
const GRID_TILES: u32 = 3;

/// Error payload message for any failed tile fetch, decode or encode.
const COMPOSE_FAILED_MSG: &str = "ERROR: Unable to compose the weather map.";

/// Map viewport size selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapZoom {
    Small,
    Medium,
    Large,
}

impl MapZoom {
    /// Slippy zoom level: continent / region / metro area.
    pub fn level(self) -> u8 {
        match self {
            MapZoom::Small => 4,
            MapZoom::Medium => 7,
            MapZoom::Large => 10,
        }
    }
}

impl FromStr for MapZoom {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(MapZoom::Small),
            "medium" => Ok(MapZoom::Medium),
            "large" => Ok(MapZoom::Large),
            _ => Err(()),
        }
    }
}

/// Weather overlay layer selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    Clouds,
    Precipitation,
    Pressure,
    Wind,
    Temperature,
}

impl MapLayer {
    /// Layer id in the tile provider's URL scheme.
    pub fn tile_id(self) -> &'static str {
        match self {
            MapLayer::Clouds => "clouds_new",
            MapLayer::Precipitation => "precipitation_new",
            MapLayer::Pressure => "pressure_new",
            MapLayer::Wind => "wind_new",
            MapLayer::Temperature => "temp_new",
        }
    }
}

impl FromStr for MapLayer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clouds" => Ok(MapLayer::Clouds),
            "precipitation" => Ok(MapLayer::Precipitation),
            "pressure" => Ok(MapLayer::Pressure),
            "wind" => Ok(MapLayer::Wind),
            "temperature" => Ok(MapLayer::Temperature),
            _ => Err(()),
        }
    }
}

/// Slippy tile coordinate containing a lat/lon at a zoom level.
///
/// Latitude is clamped to the Web Mercator domain.
pub fn tile_for(lat: f64, lon: f64, zoom: u8) -> (i32, i32) {
    let lat = lat.clamp(-85.0511, 85.0511);
    let n = 2.0_f64.powi(zoom as i32);
    let x = ((lon + 180.0) / 360.0 * n).floor() as i32;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * n)
        .floor() as i32;
    let max = n as i32 - 1;
    (x.clamp(0, max), y.clamp(0, max))
}

fn wrap_tile_x(tx: i32, n: i32) -> i32 {
    ((tx % n) + n) % n
}

/// Composes base-map and weather-layer tiles into a single image.
#[derive(Debug, Clone)]
pub struct MapAssembler {
    client: reqwest::Client,
    base_tile_url: String,
    layer_tile_url: String,
    api_key: String,
    user_agent: String,
}

impl MapAssembler {
    pub fn new(api_key: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_tile_url: BASE_TILE_URL.to_string(),
            layer_tile_url: LAYER_TILE_URL.to_string(),
            api_key: api_key.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Point both tile servers at a different host. Tests use this with wiremock.
    pub fn with_tile_urls(mut self, base: &str, layer: &str) -> Self {
        self.base_tile_url = base.trim_end_matches('/').to_string();
        self.layer_tile_url = layer.trim_end_matches('/').to_string();
        self
    }

    /// Compose the weather map for a coordinate.
    ///
    /// Fetches 9 base tiles and 9 overlay tiles sequentially, awaited in
    /// order. Rows outside the tile grid stay blank; columns wrap around the
    /// antimeridian. Returns the encoded PNG buffer.
    pub async fn assemble(
        &self,
        lat: f64,
        lon: f64,
        zoom: MapZoom,
        layer: MapLayer,
    ) -> Result<Vec<u8>, AppError> {
        let z = zoom.level();
        let n = 1i32 << z;
        let (center_x, center_y) = tile_for(lat, lon, z);

        let mut canvas = RgbaImage::new(TILE_SIZE * GRID_TILES, TILE_SIZE * GRID_TILES);

        for (row, dy) in (-1i32..=1).enumerate() {
            let ty = center_y + dy;
            if ty < 0 || ty >= n {
                continue;
            }
            for (col, dx) in (-1i32..=1).enumerate() {
                let tx = wrap_tile_x(center_x + dx, n);
                let px = (col as u32 * TILE_SIZE) as i64;
                let py = (row as u32 * TILE_SIZE) as i64;

                let base_url = format!("{}/{}/{}/{}.png", self.base_tile_url, z, tx, ty);
                let base = self.fetch_tile(&base_url).await?;
                image::imageops::overlay(&mut canvas, &base, px, py);

                let layer_url = format!(
                    "{}/map/{}/{}/{}/{}.png?appid={}",
                    self.layer_tile_url,
                    layer.tile_id(),
                    z,
                    tx,
                    ty,
                    self.api_key
                );
                let overlay = self.fetch_tile(&layer_url).await?;
                image::imageops::overlay(&mut canvas, &overlay, px, py);
            }
        }

        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| {
                tracing::error!("PNG encode failed: {}", e);
                AppError::Internal(COMPOSE_FAILED_MSG.to_string())
            })?;

        Ok(buffer)
    }

    async fn fetch_tile(&self, url: &str) -> Result<RgbaImage, AppError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Tile request failed: {}", e);
                AppError::Upstream(COMPOSE_FAILED_MSG.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!("Tile server returned HTTP {} for {}", response.status(), url);
            return Err(AppError::Upstream(COMPOSE_FAILED_MSG.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| {
                tracing::warn!("Tile read failed: {}", e);
                AppError::Upstream(COMPOSE_FAILED_MSG.to_string())
            })?;

        let tile = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|e| {
                tracing::warn!("Tile decode failed: {}", e);
                AppError::Upstream(COMPOSE_FAILED_MSG.to_string())
            })?
            .to_rgba8();

        Ok(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn solid_tile_png(r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
        let tile = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba([r, g, b, a]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(tile)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_tile_for_origin() {
        assert_eq!(tile_for(0.0, 0.0, 1), (1, 1));
    }

    #[test]
    fn test_tile_for_clamps_polar_latitudes() {
        let n = 1 << 4;
        let (_, y) = tile_for(89.9, 0.0, 4);
        assert!(y >= 0 && y < n);
        let (_, y) = tile_for(-89.9, 0.0, 4);
        assert!(y >= 0 && y < n);
    }

    #[test]
    fn test_wrap_tile_x() {
        assert_eq!(wrap_tile_x(-1, 8), 7);
        assert_eq!(wrap_tile_x(8, 8), 0);
        assert_eq!(wrap_tile_x(3, 8), 3);
    }

    #[test]
    fn test_zoom_parse_and_levels() {
        assert_eq!("small".parse::<MapZoom>(), Ok(MapZoom::Small));
        assert_eq!("large".parse::<MapZoom>().unwrap().level(), 10);
        assert!("tiny".parse::<MapZoom>().is_err());
    }

    #[test]
    fn test_layer_parse_and_tile_ids() {
        assert_eq!(
            "precipitation".parse::<MapLayer>(),
            Ok(MapLayer::Precipitation)
        );
        assert_eq!("temperature".parse::<MapLayer>().unwrap().tile_id(), "temp_new");
        assert!("radar".parse::<MapLayer>().is_err());
    }

    #[tokio::test]
    async fn test_assemble_produces_full_grid_png() {
        let server = MockServer::start().await;
        // Base tiles: /{z}/{x}/{y}.png
        Mock::given(method("GET"))
            .and(path_regex(r"^/\d+/\d+/\d+\.png$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(solid_tile_png(40, 80, 120, 255), "image/png"),
            )
            .mount(&server)
            .await;
        // Layer tiles: /map/{layer}/{z}/{x}/{y}.png
        Mock::given(method("GET"))
            .and(path_regex(r"^/map/clouds_new/\d+/\d+/\d+\.png$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(solid_tile_png(255, 255, 255, 128), "image/png"),
            )
            .mount(&server)
            .await;

        let assembler =
            MapAssembler::new("key", "test-agent").with_tile_urls(&server.uri(), &server.uri());
        let png = assembler
            .assemble(48.8534, 2.3488, MapZoom::Medium, MapLayer::Clouds)
            .await
            .unwrap();

        let composed = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(composed.width(), TILE_SIZE * GRID_TILES);
        assert_eq!(composed.height(), TILE_SIZE * GRID_TILES);
    }

    #[tokio::test]
    async fn test_assemble_tile_failure_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let assembler =
            MapAssembler::new("key", "test-agent").with_tile_urls(&server.uri(), &server.uri());
        let err = assembler
            .assemble(10.0, 10.0, MapZoom::Small, MapLayer::Wind)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
