//! Decision engine: hard gates first, then a graded score.
//!
//! Any failing gate yields [`Outcome::No`] with the reason of the first gate
//! that failed. When every gate passes, the margins by which the weather
//! beats each threshold are combined into a score and graded.

use serde::{Deserialize, Serialize};
use skiday_core::Criteria;
use skiday_weather::ResortWeather;

/// Graded answer for one resort. Declared worst to best, so `Ord` ranks
/// `Great` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    No,
    Marginal,
    /// Acceptable conditions ("OK")
    #[serde(rename = "ok")]
    Okay,
    Good,
    Great,
}

impl Outcome {
    /// Best to worst.
    pub const ALL: [Outcome; 5] = [
        Outcome::Great,
        Outcome::Good,
        Outcome::Okay,
        Outcome::Marginal,
        Outcome::No,
    ];

    /// 4 for `Great` down to 0 for `No`.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Anything but `No`.
    pub fn is_positive(&self) -> bool {
        *self != Outcome::No
    }

    /// Best outcome in `outcomes`, or `No` when empty.
    pub fn best(outcomes: impl IntoIterator<Item = Outcome>) -> Outcome {
        outcomes.into_iter().max().unwrap_or(Outcome::No)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Great => "Great",
            Outcome::Good => "Good",
            Outcome::Okay => "OK",
            Outcome::Marginal => "Marginal",
            Outcome::No => "No",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a resort got its outcome. Text is looked up by the presentation
/// layer from [`Reason::code`] and [`Reason::params`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Reason {
    LiftsClosed,
    NoResortInRange,
    TemperatureRange { min: f64, max: f64 },
    WindTooStrong { max: f64 },
    InsufficientSnowTop { min: f64 },
    InsufficientSnowBottom { min: f64 },
    InsufficientFreshSnow { min: f64 },
    /// All gates passed
    Conditions { grade: Outcome },
}

impl Reason {
    pub fn code(&self) -> &'static str {
        match self {
            Reason::LiftsClosed => "lifts_closed",
            Reason::NoResortInRange => "no_resort_in_range",
            Reason::TemperatureRange { .. } => "temp_range",
            Reason::WindTooStrong { .. } => "wind",
            Reason::InsufficientSnowTop { .. } => "snow_top",
            Reason::InsufficientSnowBottom { .. } => "snow_bottom",
            Reason::InsufficientFreshSnow { .. } => "fresh_snow",
            Reason::Conditions { grade } => match grade {
                Outcome::Great => "great",
                Outcome::Good => "good",
                Outcome::Okay => "ok",
                Outcome::Marginal => "marginal",
                Outcome::No => "no",
            },
        }
    }

    /// Named numeric parameters for the reason text.
    pub fn params(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Reason::TemperatureRange { min, max } => vec![("min", min), ("max", max)],
            Reason::WindTooStrong { max } => vec![("max", max)],
            Reason::InsufficientSnowTop { min }
            | Reason::InsufficientSnowBottom { min }
            | Reason::InsufficientFreshSnow { min } => vec![("min", min)],
            Reason::LiftsClosed | Reason::NoResortInRange | Reason::Conditions { .. } => Vec::new(),
        }
    }
}

/// Facts about the resort that are not weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateContext {
    pub season_open: bool,
    pub in_range: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub outcome: Outcome,
    pub reason: Reason,
    /// Present only when every gate passed
    pub score: Option<f64>,
}

impl Decision {
    fn rejected(reason: Reason) -> Self {
        Self {
            outcome: Outcome::No,
            reason,
            score: None,
        }
    }
}

/// Score thresholds, checked top down.
const GREAT_FROM: f64 = 25.0;
const GOOD_FROM: f64 = 15.0;
const OKAY_FROM: f64 = 8.0;

pub fn decide(criteria: &Criteria, weather: &ResortWeather, context: GateContext) -> Decision {
    if !context.season_open {
        return Decision::rejected(Reason::LiftsClosed);
    }
    if !context.in_range {
        return Decision::rejected(Reason::NoResortInRange);
    }

    // NaN temperatures fail here
    let temp_ok = weather.temp_min >= criteria.min_temp && weather.temp_max <= criteria.max_temp;
    let wind_ok = weather.wind_max <= criteria.max_wind_kmh;
    let snow_top_ok = weather.snow_top_cm >= criteria.min_snow_top_cm;
    let snow_bottom_ok = weather.snow_bottom_cm >= criteria.min_snow_bottom_cm;
    let fresh_ok = !criteria.require_fresh_snow || weather.fresh_snow_cm >= criteria.min_fresh_snow_cm;

    if !temp_ok {
        return Decision::rejected(Reason::TemperatureRange {
            min: criteria.min_temp,
            max: criteria.max_temp,
        });
    }
    if !wind_ok {
        return Decision::rejected(Reason::WindTooStrong {
            max: criteria.max_wind_kmh,
        });
    }
    if !snow_top_ok {
        return Decision::rejected(Reason::InsufficientSnowTop {
            min: criteria.min_snow_top_cm,
        });
    }
    if !snow_bottom_ok {
        return Decision::rejected(Reason::InsufficientSnowBottom {
            min: criteria.min_snow_bottom_cm,
        });
    }
    if !fresh_ok {
        return Decision::rejected(Reason::InsufficientFreshSnow {
            min: criteria.min_fresh_snow_cm,
        });
    }

    let score = score(criteria, weather);
    let outcome = grade(score);
    Decision {
        outcome,
        reason: Reason::Conditions { grade: outcome },
        score: Some(score),
    }
}

/// Weighted sum of the margins by which the weather beats each threshold.
///
/// Fresh snow always counts: against the minimum when it is required,
/// in full otherwise.
pub fn score(criteria: &Criteria, weather: &ResortWeather) -> f64 {
    let margin_temp = (weather.temp_max - criteria.min_temp).min(criteria.max_temp - weather.temp_min);
    let margin_wind = criteria.max_wind_kmh - weather.wind_max;
    let margin_snow_top = weather.snow_top_cm - criteria.min_snow_top_cm;
    let margin_snow_bottom = weather.snow_bottom_cm - criteria.min_snow_bottom_cm;
    let margin_fresh = if criteria.require_fresh_snow {
        (weather.fresh_snow_cm - criteria.min_fresh_snow_cm).max(0.0)
    } else {
        weather.fresh_snow_cm
    };

    2.0 * margin_temp
        + margin_wind
        + 0.3 * margin_snow_top
        + 0.2 * margin_snow_bottom
        + 1.2 * margin_fresh
}

/// Map a score of a resort that passed every gate to a positive outcome.
pub fn grade(score: f64) -> Outcome {
    if score >= GREAT_FROM {
        Outcome::Great
    } else if score >= GOOD_FROM {
        Outcome::Good
    } else if score >= OKAY_FROM {
        Outcome::Okay
    } else {
        Outcome::Marginal
    }
}
