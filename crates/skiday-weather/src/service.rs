//! Weather acquisition with source fallback.
//!
//! The snow-forecast feed is tried first when it is configured and the
//! resort carries a record id. Any feed failure is logged and the resort is
//! re-fetched from Open-Meteo. Open-Meteo errors are returned as-is.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use skiday_core::{Resort, WeatherConfig, WeatherError};
use tracing::instrument;

use crate::feed::SnowForecastFeed;
use crate::provider::OpenMeteoProvider;
use crate::traits::ResortWeatherSource;
use crate::types::ResortWeather;

#[derive(Debug, Clone)]
pub struct WeatherService {
    primary: OpenMeteoProvider,
    feed: Option<SnowForecastFeed>,
}

impl WeatherService {
    /// Build from configuration. The feed is enabled only when a client id is set.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let primary = OpenMeteoProvider::new(config)?;
        let feed = match SnowForecastFeed::new(
            &config.snow_forecast,
            Duration::from_secs(config.timeout_secs),
        ) {
            Ok(feed) => {
                tracing::info!("snow-forecast feed enabled");
                Some(feed)
            }
            Err(WeatherError::Configuration(reason)) => {
                tracing::debug!("snow-forecast feed disabled: {}", reason);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self::with_sources(primary, feed))
    }

    pub fn with_sources(primary: OpenMeteoProvider, feed: Option<SnowForecastFeed>) -> Self {
        Self { primary, feed }
    }

    pub fn feed_enabled(&self) -> bool {
        self.feed.is_some()
    }

    /// The feed and record to use for `resort`, or why there is none.
    fn feed_for(&self, resort: &Resort) -> Result<(&SnowForecastFeed, u64), WeatherError> {
        let feed = self
            .feed
            .as_ref()
            .ok_or_else(|| WeatherError::Configuration("feed disabled".to_string()))?;
        let record = resort.snow_forecast_record.ok_or_else(|| {
            WeatherError::Configuration(format!("{} has no snow-forecast record", resort.id))
        })?;
        Ok((feed, record))
    }

    #[instrument(skip(self, resort), fields(resort = %resort.id), level = "info")]
    pub async fn fetch(
        &self,
        resort: &Resort,
        date: NaiveDate,
    ) -> Result<ResortWeather, WeatherError> {
        match self.feed_for(resort) {
            Ok((feed, record)) => match feed.resort_weather(record, date).await {
                Ok(weather) => return Ok(weather),
                Err(e) => {
                    tracing::warn!(
                        "snow-forecast failed for {}, falling back to Open-Meteo: {}",
                        resort.id,
                        e
                    );
                }
            },
            Err(reason) => tracing::debug!("Using Open-Meteo for {}: {}", resort.id, reason),
        }

        self.primary.resort_weather(resort, date).await
    }
}

#[async_trait]
impl ResortWeatherSource for WeatherService {
    async fn resort_weather(
        &self,
        resort: &Resort,
        date: NaiveDate,
    ) -> Result<ResortWeather, WeatherError> {
        self.fetch(resort, date).await
    }
}
