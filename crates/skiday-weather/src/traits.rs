use async_trait::async_trait;
use chrono::NaiveDate;
use skiday_core::{Resort, WeatherError};

use crate::types::ResortWeather;

/// Anything that can produce aggregated weather for a resort on a date.
#[async_trait]
pub trait ResortWeatherSource: Send + Sync {
    async fn resort_weather(
        &self,
        resort: &Resort,
        date: NaiveDate,
    ) -> Result<ResortWeather, WeatherError>;
}
