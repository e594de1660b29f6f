//! snow-forecast.com feed.
//!
//! The feed returns a few days of daily values per resort record. Its key
//! names changed over time, so every metric is looked up through an ordered
//! list of accepted aliases and the first present one wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{Map, Value};
use skiday_core::error::{retry_after_secs, StatusErrorExt};
use skiday_core::{SnowForecastConfig, WeatherError};
use tracing::instrument;

use crate::types::ResortWeather;

pub const PROVIDER_NAME: &str = "snow-forecast";

const FORECAST_DAYS: &str = "6";

/// Snow depths below this are taken to be meters rather than centimeters.
const METERS_THRESHOLD: f64 = 10.0;

/// Logical metrics read from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Date,
    TempHigh,
    TempLow,
    Wind,
    SnowDepth,
    SnowDepthTop,
    SnowDepthBottom,
    FreshSnow,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Date,
        Metric::TempHigh,
        Metric::TempLow,
        Metric::Wind,
        Metric::SnowDepth,
        Metric::SnowDepthTop,
        Metric::SnowDepthBottom,
        Metric::FreshSnow,
    ];

    /// Accepted key names, most current first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Metric::Date => &["dates", "date", "Dates", "days"],
            Metric::TempHigh => &["temp_max", "max_temp", "maxTemp", "temperature_max", "high"],
            Metric::TempLow => &["temp_min", "min_temp", "minTemp", "temperature_min", "low"],
            Metric::Wind => &["wind_speed", "windSpeed", "wind", "sustained_wind"],
            Metric::SnowDepth => &["snow_depth", "snowDepth", "snow_depth_cm"],
            Metric::SnowDepthTop => &["upper_snow_depth", "snow_depth_top", "top_snow_depth"],
            Metric::SnowDepthBottom => {
                &["lower_snow_depth", "snow_depth_bottom", "bottom_snow_depth"]
            }
            Metric::FreshSnow => &["fresh_snow", "freshSnow", "new_snow", "snowfall", "snow"],
        }
    }
}

/// The `Forecasts` object of a feed response.
#[derive(Debug)]
pub(crate) struct FeedForecast<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FeedForecast<'a> {
    pub(crate) fn from_body(body: &'a Value) -> Result<Self, WeatherError> {
        let fields = body
            .get("Forecasts")
            .or_else(|| body.get("forecasts"))
            .and_then(Value::as_object)
            .ok_or_else(|| WeatherError::invalid_response(PROVIDER_NAME, "missing forecasts object"))?;
        Ok(Self { fields })
    }

    fn series(&self, metric: Metric) -> Option<&'a Vec<Value>> {
        metric
            .aliases()
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_array))
    }

    fn number(&self, metric: Metric, idx: usize) -> Option<f64> {
        self.series(metric)
            .and_then(|s| s.get(idx))
            .and_then(as_number)
    }

    /// Index of `date` in the date series; 0 when the date is absent.
    fn day_index(&self, date: NaiveDate) -> usize {
        let key = date.format("%Y-%m-%d").to_string();
        self.series(Metric::Date)
            .and_then(|dates| {
                dates
                    .iter()
                    .position(|d| d.as_str().is_some_and(|s| s.starts_with(&key)))
            })
            .unwrap_or(0)
    }

    /// Build resort weather for `date`. Fresh snow comes from the previous day.
    pub(crate) fn resort_weather(&self, date: NaiveDate) -> ResortWeather {
        let idx = self.day_index(date);

        let generic = self.number(Metric::SnowDepth, idx);
        let top = self.number(Metric::SnowDepthTop, idx);
        let bottom = self.number(Metric::SnowDepthBottom, idx);
        let snow_top_cm = top.or(generic).or(bottom).map(normalize_depth).unwrap_or(0.0);
        let snow_bottom_cm = bottom.or(generic).or(top).map(normalize_depth).unwrap_or(0.0);

        let fresh_snow_cm = idx
            .checked_sub(1)
            .and_then(|prev| self.number(Metric::FreshSnow, prev))
            .unwrap_or(0.0);

        ResortWeather {
            temp_min: self.number(Metric::TempLow, idx).unwrap_or(f64::NAN),
            temp_max: self.number(Metric::TempHigh, idx).unwrap_or(f64::NAN),
            wind_max: self.number(Metric::Wind, idx).unwrap_or(0.0),
            snow_top_cm,
            snow_bottom_cm,
            fresh_snow_cm,
        }
    }
}

fn as_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn normalize_depth(depth: f64) -> f64 {
    if depth > 0.0 && depth < METERS_THRESHOLD {
        depth * 100.0
    } else {
        depth
    }
}

#[derive(Debug, Clone)]
pub struct SnowForecastFeed {
    client: Arc<Client>,
    base_url: String,
    client_id: String,
}

impl SnowForecastFeed {
    /// Fails with `Configuration` when no client id is set.
    pub fn new(config: &SnowForecastConfig, timeout: Duration) -> Result<Self, WeatherError> {
        if !config.is_configured() {
            return Err(WeatherError::Configuration(
                "snow-forecast client_id is empty".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            client_id: config.client_id.trim().to_string(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn resort_weather(
        &self,
        record: u64,
        date: NaiveDate,
    ) -> Result<ResortWeather, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let query = [
            ("record", record.to_string()),
            ("client_id", self.client_id.clone()),
            ("days", FORECAST_DAYS.to_string()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(WeatherError::RateLimited {
                    provider: PROVIDER_NAME,
                    retry_after_secs: retry_after_secs(response.headers()),
                });
            }
            let body = response.text().await.unwrap_or_default();
            return Err(status.into_weather_error(PROVIDER_NAME, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        Ok(FeedForecast::from_body(&body)?.resort_weather(date))
    }
}
