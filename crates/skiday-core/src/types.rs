//! Domain models shared by every skiday crate.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A ski resort from the catalog. Elevations are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resort {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_top: f64,
    pub elevation_bottom: f64,
    /// Page slug on snow-forecast.com
    #[serde(default)]
    pub snow_forecast_slug: Option<String>,
    /// Record id for the snow-forecast feed, if the resort is covered by it
    #[serde(default)]
    pub snow_forecast_record: Option<u64>,
}

impl Resort {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Elevation halfway between bottom and top station.
    pub fn elevation_mid(&self) -> f64 {
        (self.elevation_top + self.elevation_bottom) / 2.0
    }
}

/// User thresholds for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub max_distance_km: f64,
    /// Lowest acceptable temperature (°C) during ski hours
    pub min_temp: f64,
    /// Highest acceptable temperature (°C) during ski hours
    pub max_temp: f64,
    pub max_wind_kmh: f64,
    pub min_snow_top_cm: f64,
    pub min_snow_bottom_cm: f64,
    pub require_fresh_snow: bool,
    pub min_fresh_snow_cm: f64,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            max_distance_km: 150.0,
            min_temp: -15.0,
            max_temp: 5.0,
            max_wind_kmh: 50.0,
            min_snow_top_cm: 30.0,
            min_snow_bottom_cm: 10.0,
            require_fresh_snow: false,
            min_fresh_snow_cm: 5.0,
        }
    }
}

/// A calendar day without a year, written `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Returns `None` for days that never exist (Feb 30, Apr 31, ...).
    /// Feb 29 is accepted.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // 2000 is a leap year, so every real month-day is representable
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// `month * 100 + day`, monotonic over the calendar year.
    pub fn key(&self) -> u32 {
        self.month * 100 + self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::Invalid(format!("expected MM-DD, got {:?}", s));
        let (m, d) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = m.parse().map_err(|_| invalid())?;
        let day = d.parse().map_err(|_| invalid())?;
        Self::new(month, day).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

/// Period in which lifts are presumed to run. `start > end` means the
/// window wraps over New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonWindow {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl Default for SeasonWindow {
    fn default() -> Self {
        Self {
            start: MonthDay { month: 12, day: 1 },
            end: MonthDay { month: 4, day: 15 },
        }
    }
}
