//! Weather acquisition for skiday
//!
//! Samples each resort at its top, bottom and mid elevation via Open-Meteo,
//! optionally preferring the snow-forecast.com feed, and geocodes the
//! starting city via Nominatim.

pub mod feed;
pub mod geocode;
pub mod provider;
pub mod service;
pub mod traits;
pub mod types;

pub use feed::SnowForecastFeed;
pub use geocode::Geocoder;
pub use provider::OpenMeteoProvider;
pub use service::WeatherService;
pub use traits::ResortWeatherSource;
pub use types::*;
