//! Batch evaluation of every resort in range.
//!
//! All resorts are fetched concurrently on the calling task. A resort whose
//! weather cannot be fetched is reported as a failure and does not affect
//! the others.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use futures::future::join_all;
use skiday_core::{Coordinate, Criteria, Resort, SeasonWindow, WeatherError};
use skiday_weather::{ResortWeather, ResortWeatherSource};

use crate::decision::{decide, GateContext, Outcome, Reason};
use crate::range::{resorts_in_range, ResortInRange};
use crate::season::is_season_open;

/// Evaluation of one resort. Never mutated after the batch completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResortResult {
    pub resort: Resort,
    pub distance_km: f64,
    pub weather: ResortWeather,
    pub outcome: Outcome,
    pub reason: Reason,
}

/// A resort whose weather could not be fetched.
#[derive(Debug)]
pub struct ResortFailure {
    pub resort: Resort,
    pub distance_km: f64,
    pub error: WeatherError,
}

/// One-line verdict over the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
    NoResortInRange,
    NoneMatch,
    OneMatches,
    ManyMatch(usize),
}

impl Summary {
    fn from_count(matching: usize) -> Self {
        match matching {
            0 => Summary::NoneMatch,
            1 => Summary::OneMatches,
            n => Summary::ManyMatch(n),
        }
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub date: NaiveDate,
    pub season_open: bool,
    /// Best outcome over all results
    pub overall: Outcome,
    pub summary: Summary,
    /// Resorts whose outcome is not `No`
    pub matching: usize,
    /// Ranked best first, nearest first within an outcome
    pub results: Vec<ResortResult>,
    pub failures: Vec<ResortFailure>,
}

impl BatchReport {
    fn empty(date: NaiveDate, season_open: bool) -> Self {
        Self {
            date,
            season_open,
            overall: Outcome::No,
            summary: Summary::NoResortInRange,
            matching: 0,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Reason for the overall outcome when no resort could be considered.
    pub fn reason(&self) -> Option<Reason> {
        (self.summary == Summary::NoResortInRange).then_some(Reason::NoResortInRange)
    }

    /// True if any resort failed because a provider asked us to slow down.
    pub fn rate_limited(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_rate_limited())
    }
}

/// Range-filter the catalog around `origin` and evaluate what is left.
pub async fn evaluate_from<S>(
    source: &S,
    origin: Coordinate,
    catalog: &[Resort],
    date: NaiveDate,
    criteria: &Criteria,
    season: &SeasonWindow,
) -> BatchReport
where
    S: ResortWeatherSource + ?Sized,
{
    let in_range = resorts_in_range(origin, criteria.max_distance_km, catalog);
    evaluate_batch(source, in_range, date, criteria, season).await
}

/// Fetch weather for every resort concurrently and decide each one.
pub async fn evaluate_batch<S>(
    source: &S,
    resorts: Vec<ResortInRange>,
    date: NaiveDate,
    criteria: &Criteria,
    season: &SeasonWindow,
) -> BatchReport
where
    S: ResortWeatherSource + ?Sized,
{
    let season_open = is_season_open(date, season);

    if resorts.is_empty() {
        tracing::info!("No resort within {} km", criteria.max_distance_km);
        return BatchReport::empty(date, season_open);
    }

    tracing::info!(
        "Evaluating {} resorts for {} (season open: {})",
        resorts.len(),
        date,
        season_open
    );

    let fetched = join_all(resorts.into_iter().map(|candidate| async move {
        let weather = source.resort_weather(&candidate.resort, date).await;
        (candidate, weather)
    }))
    .await;

    let mut results = Vec::with_capacity(fetched.len());
    let mut failures = Vec::new();

    for (candidate, weather) in fetched {
        match weather {
            Ok(weather) => {
                let context = GateContext {
                    season_open,
                    in_range: candidate.distance_km <= criteria.max_distance_km,
                };
                let decision = decide(criteria, &weather, context);
                tracing::debug!(
                    "{}: {} ({})",
                    candidate.resort.id,
                    decision.outcome,
                    decision.reason.code()
                );
                results.push(ResortResult {
                    resort: candidate.resort,
                    distance_km: candidate.distance_km,
                    weather,
                    outcome: decision.outcome,
                    reason: decision.reason,
                });
            }
            Err(error) => {
                tracing::error!("Weather for {} unavailable: {}", candidate.resort.id, error);
                failures.push(ResortFailure {
                    resort: candidate.resort,
                    distance_km: candidate.distance_km,
                    error,
                });
            }
        }
    }

    sort_results(&mut results, SortKey::Outcome, SortDirection::Descending);

    let overall = Outcome::best(results.iter().map(|r| r.outcome));
    let matching = results.iter().filter(|r| r.outcome.is_positive()).count();

    tracing::info!(
        "Overall {}: {} of {} resorts match, {} failed",
        overall,
        matching,
        results.len(),
        failures.len()
    );

    BatchReport {
        date,
        season_open,
        overall,
        summary: Summary::from_count(matching),
        matching,
        results,
        failures,
    }
}

/// Column to order a result table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Outcome,
    Name,
    Distance,
    TempMin,
    TempMax,
    WindMax,
    SnowTop,
    SnowBottom,
    FreshSnow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortKey {
    /// Outcome and distance open best/farthest first, everything else ascending.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortKey::Outcome | SortKey::Distance => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    fn value(&self, r: &ResortResult) -> f64 {
        let v = match self {
            SortKey::Distance => r.distance_km,
            SortKey::TempMin => r.weather.temp_min,
            SortKey::TempMax => r.weather.temp_max,
            SortKey::WindMax => r.weather.wind_max,
            SortKey::SnowTop => r.weather.snow_top_cm,
            SortKey::SnowBottom => r.weather.snow_bottom_cm,
            SortKey::FreshSnow => r.weather.fresh_snow_cm,
            SortKey::Outcome | SortKey::Name => 0.0,
        };
        if v.is_finite() {
            v
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// Accepts `temp-min`, `temp_min` and `tempMin` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "outcome" => Ok(SortKey::Outcome),
            "name" => Ok(SortKey::Name),
            "distance" => Ok(SortKey::Distance),
            "tempmin" => Ok(SortKey::TempMin),
            "tempmax" => Ok(SortKey::TempMax),
            "wind" | "windmax" => Ok(SortKey::WindMax),
            "snowtop" => Ok(SortKey::SnowTop),
            "snowbottom" => Ok(SortKey::SnowBottom),
            "fresh" | "freshsnow" => Ok(SortKey::FreshSnow),
            _ => Err(format!("unknown sort key {:?}", s)),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("unknown sort direction {:?}", s)),
        }
    }
}

/// Stable sort of `results` by `key`.
///
/// Sorting by outcome breaks ties by distance, nearest first, in either
/// direction. Non-finite numbers sort below everything else.
pub fn sort_results(results: &mut [ResortResult], key: SortKey, direction: SortDirection) {
    let directed = |o: Ordering| match direction {
        SortDirection::Ascending => o,
        SortDirection::Descending => o.reverse(),
    };

    results.sort_by(|a, b| match key {
        SortKey::Outcome => directed(a.outcome.cmp(&b.outcome))
            .then_with(|| a.distance_km.total_cmp(&b.distance_km)),
        SortKey::Name => directed(
            a.resort
                .name
                .to_lowercase()
                .cmp(&b.resort.name.to_lowercase()),
        ),
        _ => directed(key.value(a).total_cmp(&key.value(b))),
    });
}
