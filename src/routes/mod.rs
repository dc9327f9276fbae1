pub mod graph;
pub mod health;
pub mod location;
pub mod weather;
pub mod weather_map;

use crate::services::geocode::GeocodeClient;
use crate::services::map::MapAssembler;
use crate::services::openweather::OneCallClient;

/// Shared application state: the three upstream clients. The server itself
/// is stateless across requests.
#[derive(Clone)]
pub struct AppState {
    pub geocoder: GeocodeClient,
    pub weather: OneCallClient,
    pub map: MapAssembler,
}
