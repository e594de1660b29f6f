use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use skiday_core::Resort;

/// First hour of the ski-hours window (local time, inclusive)
pub const SKI_HOURS_START: u32 = 8;

/// Last hour of the ski-hours window (local time, inclusive)
pub const SKI_HOURS_END: u32 = 16;

/// Whether a local time of day falls within 08:00..=16:00.
pub fn is_ski_hour(time: NaiveTime) -> bool {
    let after_start = time.hour() >= SKI_HOURS_START;
    let before_end = time.hour() < SKI_HOURS_END
        || (time.hour() == SKI_HOURS_END && time.minute() == 0 && time.second() == 0);
    after_start && before_end
}

/// Elevation at which a resort is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Bottom,
    Mid,
}

impl Band {
    pub fn elevation(&self, resort: &Resort) -> f64 {
        match self {
            Self::Top => resort.elevation_top,
            Self::Bottom => resort.elevation_bottom,
            Self::Mid => resort.elevation_mid(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Mid => "mid",
        }
    }
}

/// Weather at one elevation of one resort for the target date.
///
/// Temperatures are NaN when the provider returned no usable value during
/// ski hours; NaN never passes a threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Lowest temperature (°C) during ski hours
    pub temp_min: f64,
    /// Highest temperature (°C) during ski hours
    pub temp_max: f64,
    /// Strongest wind or gust (km/h) during ski hours
    pub wind_max: f64,
    /// Deepest snow cover on the target date
    pub snow_depth_cm: f64,
    /// Snowfall on the day before the target date
    pub fresh_snow_cm: f64,
}

/// Weather for a whole resort, aggregated over its bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResortWeather {
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_max: f64,
    pub snow_top_cm: f64,
    pub snow_bottom_cm: f64,
    pub fresh_snow_cm: f64,
}

impl ResortWeather {
    /// Temperature is taken at mid-mountain, wind is the worse of top and
    /// bottom, fresh snow is the top/bottom mean.
    pub fn from_bands(top: &WeatherSample, bottom: &WeatherSample, mid: &WeatherSample) -> Self {
        Self {
            temp_min: mid.temp_min,
            temp_max: mid.temp_max,
            wind_max: top.wind_max.max(bottom.wind_max),
            snow_top_cm: top.snow_depth_cm,
            snow_bottom_cm: bottom.snow_depth_cm,
            fresh_snow_cm: (top.fresh_snow_cm + bottom.fresh_snow_cm) / 2.0,
        }
    }
}
