//! Open-Meteo point forecasts.
//!
//! One request per (coordinate, elevation). The elevation parameter makes
//! Open-Meteo downscale temperature to that altitude, which is how a single
//! resort yields distinct top, bottom and mid samples.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use skiday_core::error::{retry_after_secs, StatusErrorExt};
use skiday_core::{Resort, WeatherConfig, WeatherError};
use tracing::instrument;

use crate::types::{is_ski_hour, Band, ResortWeather, WeatherSample};

pub const PROVIDER_NAME: &str = "open-meteo";

const HOURLY_FIELDS: &str = "temperature_2m,snow_depth,wind_speed_10m,wind_gusts_10m";
const DAILY_FIELDS: &str = "snowfall_sum";
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    hourly: Option<HourlySeries>,
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    snow_depth: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    snowfall_sum: Vec<Option<f64>>,
}

fn value_at(series: &[Option<f64>], idx: usize) -> Option<f64> {
    series.get(idx).copied().flatten().filter(|v| v.is_finite())
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Arc<Client>,
    base_url: String,
    timezone: String,
}

impl OpenMeteoProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.open_meteo_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    /// Sample all three bands of a resort concurrently and aggregate them.
    #[instrument(skip(self, resort), fields(resort = %resort.id), level = "debug")]
    pub async fn resort_weather(
        &self,
        resort: &Resort,
        date: NaiveDate,
    ) -> Result<ResortWeather, WeatherError> {
        let (top, bottom, mid) = tokio::try_join!(
            self.band_sample(resort, Band::Top, date),
            self.band_sample(resort, Band::Bottom, date),
            self.band_sample(resort, Band::Mid, date),
        )?;

        Ok(ResortWeather::from_bands(&top, &bottom, &mid))
    }

    async fn band_sample(
        &self,
        resort: &Resort,
        band: Band,
        date: NaiveDate,
    ) -> Result<WeatherSample, WeatherError> {
        let elevation = band.elevation(resort);
        tracing::debug!(
            "Fetching {} band of {} at {} m",
            band.as_str(),
            resort.id,
            elevation
        );
        self.sample(resort.lat, resort.lon, elevation, date).await
    }

    /// Fetch one point and reduce it to a sample for `date`.
    #[instrument(skip(self), level = "debug")]
    pub async fn sample(
        &self,
        lat: f64,
        lon: f64,
        elevation: f64,
        date: NaiveDate,
    ) -> Result<WeatherSample, WeatherError> {
        let previous = date.pred_opt().unwrap_or(date);
        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("elevation", elevation.to_string()),
            ("start_date", previous.format(DAY_FORMAT).to_string()),
            ("end_date", date.format(DAY_FORMAT).to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", self.timezone.clone()),
            ("temperature_unit", "celsius".to_string()),
            ("wind_speed_unit", "kmh".to_string()),
            ("precipitation_unit", "mm".to_string()),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(response.headers());
                tracing::warn!("Open-Meteo rate limited, retry after {}s", retry_after);
                return Err(WeatherError::RateLimited {
                    provider: PROVIDER_NAME,
                    retry_after_secs: retry_after,
                });
            }
            let body = response.text().await.unwrap_or_default();
            return Err(status.into_weather_error(PROVIDER_NAME, body));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        extract_sample(&body, date)
    }
}

/// Reduce a forecast response to the values relevant for `date`.
///
/// Hourly temperature and wind are restricted to ski hours on `date`; snow
/// depth is the maximum over all hours of `date` (meters converted to cm);
/// fresh snow is the daily snowfall of the previous day (mm converted to cm).
pub(crate) fn extract_sample(
    body: &ForecastResponse,
    date: NaiveDate,
) -> Result<WeatherSample, WeatherError> {
    let hourly = body
        .hourly
        .as_ref()
        .ok_or_else(|| WeatherError::invalid_response(PROVIDER_NAME, "missing hourly series"))?;

    let mut temp_min = f64::NAN;
    let mut temp_max = f64::NAN;
    let mut wind_max: f64 = 0.0;
    let mut depth_m: f64 = 0.0;

    for (idx, raw) in hourly.time.iter().enumerate() {
        let Ok(at) = NaiveDateTime::parse_from_str(raw, HOUR_FORMAT) else {
            tracing::debug!("Skipping unparsable hour {:?}", raw);
            continue;
        };
        if at.date() != date {
            continue;
        }

        if let Some(depth) = value_at(&hourly.snow_depth, idx) {
            depth_m = depth_m.max(depth);
        }

        if !is_ski_hour(at.time()) {
            continue;
        }

        if let Some(t) = value_at(&hourly.temperature_2m, idx) {
            // f64::min/max ignore a NaN operand, so the first real value wins
            temp_min = temp_min.min(t);
            temp_max = temp_max.max(t);
        }

        let wind = value_at(&hourly.wind_speed_10m, idx).unwrap_or(0.0);
        let gust = value_at(&hourly.wind_gusts_10m, idx).unwrap_or(0.0);
        wind_max = wind_max.max(wind).max(gust);
    }

    let fresh_snow_cm = date
        .pred_opt()
        .and_then(|previous| {
            let daily = body.daily.as_ref()?;
            let key = previous.format(DAY_FORMAT).to_string();
            let idx = daily.time.iter().position(|t| *t == key)?;
            value_at(&daily.snowfall_sum, idx)
        })
        .map(|mm| mm / 10.0)
        .unwrap_or(0.0);

    Ok(WeatherSample {
        temp_min,
        temp_max,
        wind_max,
        snow_depth_cm: depth_m * 100.0,
        fresh_snow_cm,
    })
}
