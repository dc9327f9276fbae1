/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap API key (One Call + weather-layer tiles).
    pub owm_api_key: String,
    /// Mapbox access token for forward geocoding.
    pub mapbox_token: String,
    pub port: u16,
    /// Directory containing the built single-page app bundle.
    pub static_dir: String,
    /// User-Agent sent to the base-map tile server.
    pub tile_user_agent: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            owm_api_key: std::env::var("OWM_API_KEY").expect("OWM_API_KEY must be set"),
            mapbox_token: std::env::var("MAPBOX_TOKEN").expect("MAPBOX_TOKEN must be set"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string()),
            tile_user_agent: std::env::var("TILE_USER_AGENT").unwrap_or_else(|_| {
                "WeatherAtlas/0.1 github.com/weather-atlas/weather-atlas".to_string()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // NOTE: set_var/remove_var in tests is unsafe in multi-threaded contexts
        // (Rust may run tests in parallel). This test only exercises the
        // default-value logic; cargo runs this module's tests sequentially
        // within one test binary, so we accept the risk.
        unsafe {
            std::env::set_var("OWM_API_KEY", "test-owm-key");
            std::env::set_var("MAPBOX_TOKEN", "test-mapbox-token");
            std::env::remove_var("PORT");
            std::env::remove_var("STATIC_DIR");
            std::env::remove_var("TILE_USER_AGENT");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.port, 5000);
        assert_eq!(config.static_dir, "./public");
        assert!(config.tile_user_agent.contains("WeatherAtlas"));
    }
}
